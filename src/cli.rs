use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{
    listing::{ListingDraft, ListingFilter, ListingPatch, Parking},
    profile::ProfilePatch,
};

#[derive(Debug, Parser)]
#[command(
    name = "gatorkeys",
    about = "Student sublease marketplace client (chat TUI + CLI)"
)]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the chat shell
    Run,
    /// Log in; the password is read from the terminal
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create an account and log in as it
    Register(RegisterArgs),
    /// Forget the stored identity
    Logout,
    /// Print the stored identity
    Whoami,
    /// Browse and manage sublease listings
    #[command(subcommand)]
    Listings(ListingsCommand),
    /// Show or edit a user profile
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// Date of birth, as the server stores it
    #[arg(long)]
    pub dob: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ListingsCommand {
    /// All listings, newest first
    List,
    /// Listings of the logged-in user
    Mine,
    Show {
        id: String,
    },
    /// Delete one of your listings
    Delete {
        id: String,
    },
    Filter(FilterArgs),
    Create(CreateListingArgs),
    /// Change fields of one of your listings
    Update {
        id: String,
        #[command(flatten)]
        fields: UpdateListingArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Case-insensitive substring of the title
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub max_price: Option<f64>,
    #[arg(long)]
    pub furnished: Option<bool>,
    /// included, additional-fee or none
    #[arg(long)]
    pub parking: Option<Parking>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn into_filter(self) -> ListingFilter {
        ListingFilter {
            title: self.title,
            max_price: self.max_price,
            furnished: self.furnished,
            parking: self.parking,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CreateListingArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long)]
    pub address: String,
    #[arg(long, default_value = "")]
    pub contact_name: String,
    /// Defaults to the logged-in user
    #[arg(long)]
    pub contact_email: Option<String>,
    #[arg(long)]
    pub available_from: Option<NaiveDate>,
    #[arg(long)]
    pub available_to: Option<NaiveDate>,
    #[arg(long)]
    pub parking: Option<Parking>,
    #[arg(long)]
    pub furnished: bool,
    #[arg(long)]
    pub notes: Option<String>,
    /// Image URL; repeat for several
    #[arg(long = "image")]
    pub images: Vec<String>,
}

impl CreateListingArgs {
    pub fn into_draft(self, current_email: Option<&str>) -> ListingDraft {
        let contact_email = self
            .contact_email
            .or_else(|| current_email.map(str::to_owned))
            .unwrap_or_default();

        ListingDraft {
            title: self.title,
            price: self.price,
            address: self.address,
            contact_name: self.contact_name,
            contact_email,
            available_from: self.available_from,
            available_to: self.available_to,
            parking: self.parking,
            furnished: self.furnished,
            notes: self.notes,
            images: self.images,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct UpdateListingArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub contact_name: Option<String>,
    #[arg(long)]
    pub contact_email: Option<String>,
    #[arg(long)]
    pub available_from: Option<NaiveDate>,
    #[arg(long)]
    pub available_to: Option<NaiveDate>,
    #[arg(long)]
    pub parking: Option<Parking>,
    #[arg(long)]
    pub furnished: Option<bool>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl UpdateListingArgs {
    pub fn into_patch(self) -> ListingPatch {
        ListingPatch {
            title: self.title,
            price: self.price,
            address: self.address,
            contact_name: self.contact_name,
            contact_email: self.contact_email,
            available_from: self.available_from,
            available_to: self.available_to,
            parking: self.parking,
            furnished: self.furnished,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProfileCommand {
    Show {
        /// Defaults to the logged-in user
        #[arg(long)]
        email: Option<String>,
    },
    /// Edit your own profile
    Update(ProfileUpdateArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub university: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    /// Absolute URL of a .jpg, .jpeg, .png, .gif or .webp image
    #[arg(long)]
    pub profilepic: Option<String>,
}

impl ProfileUpdateArgs {
    pub fn into_patch(self) -> ProfilePatch {
        ProfilePatch {
            name: self.name,
            phone: self.phone,
            university: self.university,
            bio: self.bio,
            profilepic: self.profilepic,
        }
    }
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
