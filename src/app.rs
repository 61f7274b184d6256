use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::runtime::{Builder, Runtime};

use crate::{
    api,
    cli::{Cli, Command, ListingsCommand, ProfileCommand, RegisterArgs},
    domain,
    infra::{self, error::AppError},
    ui,
    usecases::{
        self, accounts,
        bootstrap::{self, LogTarget},
        context::AppContext,
        listings::{self, ListingLookup},
        profile,
    },
};

const COMMAND_FAILED: &str = "COMMAND_FAILED";

pub fn run(cli: Cli) -> Result<()> {
    let command = cli.command_or_default();
    let log_target = match command {
        Command::Run => LogTarget::LogFile,
        _ => LogTarget::Stderr,
    };

    let context = bootstrap::bootstrap(cli.config.as_deref(), log_target)?;
    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        api = api::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let runtime = build_runtime()?;
    let outcome = dispatch(&context, &runtime, command);
    if let Err(error) = &outcome {
        tracing::debug!(code = COMMAND_FAILED, error = %error, "command failed");
    }

    context.identity.teardown();
    outcome
}

fn build_runtime() -> Result<Runtime> {
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;
    Ok(runtime)
}

fn dispatch(context: &AppContext, runtime: &Runtime, command: Command) -> Result<()> {
    let client = context.client.as_ref();
    let identity = context.identity.as_ref();

    match command {
        Command::Run => {
            let mut shell = bootstrap::compose_shell(context, runtime.handle());
            ui::shell::start(context, shell.event_source.as_mut(), &mut shell.orchestrator)?;
        }
        Command::Login { email } => {
            let password = rpassword::prompt_password("Password: ")
                .context("failed to read the password")?;
            let email = runtime.block_on(accounts::login(identity, client, &email, &password))?;
            println!("Logged in as {email}.");
        }
        Command::Register(args) => {
            let form = prompt_register_form(args)?;
            let email = runtime.block_on(accounts::register(identity, client, form))?;
            println!("Account created. Logged in as {email}.");
        }
        Command::Logout => {
            accounts::logout(identity)?;
            println!("Logged out.");
        }
        Command::Whoami => match accounts::whoami(identity) {
            Some(email) => println!("{email}"),
            None => println!("Not logged in."),
        },
        Command::Listings(command) => run_listings(context, runtime, command)?,
        Command::Profile(command) => run_profile(context, runtime, command)?,
    }

    Ok(())
}

fn prompt_register_form(args: RegisterArgs) -> Result<accounts::RegisterForm> {
    let password =
        rpassword::prompt_password("Password: ").context("failed to read the password")?;
    let confirm_password = rpassword::prompt_password("Confirm password: ")
        .context("failed to read the password confirmation")?;

    Ok(accounts::RegisterForm {
        email: args.email,
        password,
        confirm_password,
        first_name: args.first_name,
        last_name: args.last_name,
        dob: args.dob,
        gender: args.gender,
    })
}

fn run_listings(context: &AppContext, runtime: &Runtime, command: ListingsCommand) -> Result<()> {
    let client = context.client.as_ref();

    match command {
        ListingsCommand::List => print_json(&runtime.block_on(listings::list_listings(client))?),
        ListingsCommand::Mine => {
            let email = require_login(context)?;
            print_json(&runtime.block_on(listings::user_listings(client, &email))?)
        }
        ListingsCommand::Show { id } => {
            match runtime.block_on(listings::get_listing(client, &id))? {
                ListingLookup::Found(listing) => print_json(&listing),
                ListingLookup::NotFound => bail!("listing {id} not found"),
            }
        }
        ListingsCommand::Delete { id } => {
            let email = require_login(context)?;
            runtime.block_on(async {
                ensure_owner(client, &email, &id).await?;
                listings::delete_listing(client, &id).await?;
                anyhow::Ok(())
            })?;
            println!("Listing {id} deleted.");
            Ok(())
        }
        ListingsCommand::Filter(args) => {
            let filter = args.into_filter();
            print_json(&runtime.block_on(listings::filter_listings(client, &filter))?)
        }
        ListingsCommand::Create(args) => {
            let email = require_login(context)?;
            let draft = args.into_draft(Some(&email));
            print_json(&runtime.block_on(listings::create_listing(client, draft))?)
        }
        ListingsCommand::Update { id, fields } => {
            let email = require_login(context)?;
            let patch = fields.into_patch();
            let updated = runtime.block_on(async {
                ensure_owner(client, &email, &id).await?;
                anyhow::Ok(listings::update_listing(client, &id, &patch).await?)
            })?;
            print_json(&updated)
        }
    }
}

async fn ensure_owner(client: &api::MarketplaceClient, email: &str, id: &str) -> Result<()> {
    if !listings::owns_listing(client, email, id).await? {
        bail!("listing {id} is not one of your listings");
    }
    Ok(())
}

fn run_profile(context: &AppContext, runtime: &Runtime, command: ProfileCommand) -> Result<()> {
    let client = context.client.as_ref();

    match command {
        ProfileCommand::Show { email } => {
            let email = match email {
                Some(email) => email,
                None => require_login(context)?,
            };
            print_json(&runtime.block_on(profile::show_profile(client, &email))?)
        }
        ProfileCommand::Update(args) => {
            let email = require_login(context)?;
            let patch = args.into_patch();
            print_json(&runtime.block_on(profile::update_profile(client, &email, &patch))?)
        }
    }
}

fn require_login(context: &AppContext) -> Result<String> {
    context
        .identity
        .current_email()
        .context("not logged in; run `gatorkeys login --email <you@ufl.edu>` first")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}
