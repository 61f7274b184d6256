use anyhow::Result;

use crate::domain::{events::AppEvent, widget_state::WidgetState};

use super::{
    list_conversations::ConversationsSource, load_messages::MessagesSource,
    mark_read::ReadMarker, send_message::MessageSender,
};

/// Everything the chat widget needs from the backend.
pub trait ChatBackend:
    ConversationsSource + MessagesSource + MessageSender + ReadMarker + Send + Sync + 'static
{
}

impl<T> ChatBackend for T where
    T: ConversationsSource + MessagesSource + MessageSender + ReadMarker + Send + Sync + 'static
{
}

pub trait AppEventSource {
    /// `None` means nothing worth handling arrived.
    fn next_event(&mut self) -> Result<Option<AppEvent>>;

    /// True once the source will never produce another event.
    fn is_exhausted(&self) -> bool {
        false
    }
}

pub trait ShellOrchestrator {
    fn is_running(&self) -> bool;
    fn widget(&self) -> &WidgetState;
    fn current_email(&self) -> Option<String>;
    fn handle_event(&mut self, event: AppEvent) -> Result<()>;
}
