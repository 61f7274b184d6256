use super::{
    compose_state::ComposeState, conversation_list_state::ConversationListState,
    message_input_state::MessageInputState, thread_state::ThreadState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetView {
    /// Panel hidden; only the toggle (with unread badge) is shown.
    #[default]
    Closed,
    /// Conversation summaries, optionally with the composer open.
    List,
    /// A single conversation.
    Thread,
}

/// Everything one chat widget instance renders from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetState {
    view: WidgetView,
    login_required: bool,
    conversations: ConversationListState,
    thread: ThreadState,
    input: MessageInputState,
    compose: ComposeState,
    last_error: Option<String>,
}

impl WidgetState {
    pub fn view(&self) -> WidgetView {
        self.view
    }

    pub fn set_view(&mut self, view: WidgetView) {
        self.view = view;
    }

    pub fn is_open(&self) -> bool {
        self.view != WidgetView::Closed
    }

    /// The panel is open but nobody is logged in.
    pub fn login_required(&self) -> bool {
        self.login_required
    }

    pub fn set_login_required(&mut self, required: bool) {
        self.login_required = required;
    }

    pub fn conversations(&self) -> &ConversationListState {
        &self.conversations
    }

    pub fn conversations_mut(&mut self) -> &mut ConversationListState {
        &mut self.conversations
    }

    pub fn thread(&self) -> &ThreadState {
        &self.thread
    }

    pub fn thread_mut(&mut self) -> &mut ThreadState {
        &mut self.thread
    }

    pub fn input(&self) -> &MessageInputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut MessageInputState {
        &mut self.input
    }

    pub fn compose(&self) -> &ComposeState {
        &self.compose
    }

    pub fn compose_mut(&mut self) -> &mut ComposeState {
        &mut self.compose
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn unread_total(&self) -> u32 {
        self.conversations.unread_total()
    }

    /// Unread count for the toggle button: only while closed, never zero.
    pub fn badge(&self) -> Option<u32> {
        let total = self.unread_total();
        (self.view == WidgetView::Closed && total > 0).then_some(total)
    }
}
