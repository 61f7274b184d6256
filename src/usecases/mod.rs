//! Use case layer: application workflows and orchestration.

pub mod accounts;
pub mod bootstrap;
pub mod chat_widget;
pub mod context;
pub mod contracts;
pub mod identity;
pub mod list_conversations;
pub mod listings;
pub mod load_messages;
pub mod mark_read;
pub mod polling;
pub mod profile;
pub mod send_message;
pub mod shell;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
