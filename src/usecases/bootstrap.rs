use std::{path::Path, sync::Arc, time::Duration};

use tokio::runtime::Handle;

use crate::{
    api::MarketplaceClient,
    infra::{
        self,
        error::AppError,
        identity_file::FileIdentityStorage,
        logging::LogSink,
        storage_layout::StorageLayout,
    },
    usecases::{
        chat_widget::ChatWidget, context::AppContext, contracts::AppEventSource,
        identity::IdentityStore, shell::ChatShellOrchestrator,
    },
};

/// Where the process sends its logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// One-shot commands: stderr.
    Stderr,
    /// The chat shell owns the terminal: `<config dir>/logs/gatorkeys.log`.
    LogFile,
}

pub fn bootstrap(
    config_path: Option<&Path>,
    log_target: LogTarget,
) -> Result<AppContext, AppError> {
    let context = build_context(config_path, StorageLayout::resolve()?)?;

    let sink = match log_target {
        LogTarget::Stderr => LogSink::Stderr,
        LogTarget::LogFile => LogSink::File(&context.layout.log_dir),
    };
    infra::logging::init(&context.config.logging, sink)?;

    let identity = context.identity.init();
    tracing::debug!(
        api_base = context.client.base_url(),
        authenticated = identity.email().is_some(),
        "context ready"
    );

    Ok(context)
}

pub(crate) fn build_context(
    config_path: Option<&Path>,
    layout: StorageLayout,
) -> Result<AppContext, AppError> {
    let config = infra::config::load(config_path)?;
    layout.ensure_dirs()?;

    let storage = FileIdentityStorage::new(layout.identity_file());
    let identity = IdentityStore::new(Box::new(storage));
    let client = MarketplaceClient::new(&config.api)?;

    Ok(AppContext::new(config, layout, identity, client))
}

pub struct ShellComposition {
    pub event_source: Box<dyn AppEventSource>,
    pub orchestrator: ChatShellOrchestrator<MarketplaceClient>,
}

pub fn compose_shell(context: &AppContext, runtime: &Handle) -> ShellComposition {
    let widget = ChatWidget::new(
        Arc::clone(&context.client),
        Arc::clone(&context.identity),
        runtime.clone(),
        Duration::from_millis(context.config.chat.poll_interval_ms),
    );

    ShellComposition {
        event_source: Box::new(crate::ui::CrosstermEventSource),
        orchestrator: ChatShellOrchestrator::new(widget, runtime.clone()),
    }
}
