use super::conversation::{unread_total, ConversationSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationListUiState {
    Loading,
    Ready,
    Empty,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationListState {
    ui_state: ConversationListUiState,
    conversations: Vec<ConversationSummary>,
    selected_index: Option<usize>,
}

impl Default for ConversationListState {
    fn default() -> Self {
        Self {
            ui_state: ConversationListUiState::Loading,
            conversations: Vec::new(),
            selected_index: None,
        }
    }
}

impl ConversationListState {
    pub fn ui_state(&self) -> ConversationListUiState {
        self.ui_state
    }

    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&ConversationSummary> {
        self.selected_index
            .and_then(|index| self.conversations.get(index))
    }

    pub fn find(&self, other_user_email: &str) -> Option<&ConversationSummary> {
        self.conversations
            .iter()
            .find(|conversation| {
                conversation
                    .other_user_email
                    .eq_ignore_ascii_case(other_user_email)
            })
    }

    /// Recomputed from the current list every time, never cached.
    pub fn unread_total(&self) -> u32 {
        unread_total(&self.conversations)
    }

    /// True once a fetch has landed, successfully or not.
    pub fn is_settled(&self) -> bool {
        self.ui_state != ConversationListUiState::Loading
    }

    pub fn set_loading(&mut self) {
        self.ui_state = ConversationListUiState::Loading;
        self.conversations.clear();
        self.selected_index = None;
    }

    pub fn set_ready(&mut self, conversations: Vec<ConversationSummary>) {
        if conversations.is_empty() {
            self.set_empty();
            return;
        }

        let previous = self
            .selected()
            .map(|conversation| conversation.other_user_email.clone());
        self.ui_state = ConversationListUiState::Ready;
        self.conversations = conversations;
        self.selected_index = resolve_selection_index(&self.conversations, previous.as_deref());
    }

    pub fn set_empty(&mut self) {
        self.ui_state = ConversationListUiState::Empty;
        self.conversations.clear();
        self.selected_index = None;
    }

    pub fn set_error(&mut self) {
        self.ui_state = ConversationListUiState::Error;
        self.conversations.clear();
        self.selected_index = None;
    }

    /// Drops the counterpart's unread count locally once the thread is viewed.
    pub fn mark_read_locally(&mut self, other_user_email: &str) {
        if let Some(conversation) = self
            .conversations
            .iter_mut()
            .find(|conversation| {
                conversation
                    .other_user_email
                    .eq_ignore_ascii_case(other_user_email)
            })
        {
            conversation.unread_count = 0;
        }
    }

    pub fn select_next(&mut self) {
        let Some(index) = self.selected_index else {
            return;
        };

        let last_index = self.conversations.len().saturating_sub(1);
        self.selected_index = Some(std::cmp::min(index.saturating_add(1), last_index));
    }

    pub fn select_previous(&mut self) {
        let Some(index) = self.selected_index else {
            return;
        };

        self.selected_index = Some(index.saturating_sub(1));
    }
}

fn resolve_selection_index(
    conversations: &[ConversationSummary],
    previous_email: Option<&str>,
) -> Option<usize> {
    if conversations.is_empty() {
        return None;
    }

    previous_email
        .and_then(|email| {
            conversations
                .iter()
                .position(|conversation| conversation.other_user_email == email)
        })
        .or(Some(0))
}
