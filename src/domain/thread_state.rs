use super::message::{DeliveryState, Message, ThreadMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadUiState {
    Empty,
    Loading,
    Ready,
    Error,
}

/// Messages of the one conversation currently open in the widget.
///
/// Every `open` and `close` bumps `generation`; responses tagged with an older
/// generation belong to a thread that is no longer on screen, or were fetched
/// before newer server truth was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadState {
    other_user_email: Option<String>,
    messages: Vec<ThreadMessage>,
    ui_state: ThreadUiState,
    generation: u64,
    scroll_from_bottom: usize,
}

impl Default for ThreadState {
    fn default() -> Self {
        Self {
            other_user_email: None,
            messages: Vec::new(),
            ui_state: ThreadUiState::Empty,
            generation: 0,
            scroll_from_bottom: 0,
        }
    }
}

impl ThreadState {
    pub fn other_user_email(&self) -> Option<&str> {
        self.other_user_email.as_deref()
    }

    pub fn messages(&self) -> &[ThreadMessage] {
        &self.messages
    }

    pub fn ui_state(&self) -> ThreadUiState {
        self.ui_state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scroll_from_bottom(&self) -> usize {
        self.scroll_from_bottom
    }

    pub fn is_open(&self) -> bool {
        self.other_user_email.is_some()
    }

    /// Whether a response fetched for `(generation, other_user_email)` still
    /// belongs on screen.
    pub fn accepts(&self, generation: u64, other_user_email: &str) -> bool {
        self.generation == generation
            && self
                .other_user_email
                .as_deref()
                .is_some_and(|open| open.eq_ignore_ascii_case(other_user_email))
    }

    /// Opens a thread with an empty message list and returns its generation.
    pub fn open(&mut self, other_user_email: &str) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.other_user_email = Some(other_user_email.to_owned());
        self.messages.clear();
        self.ui_state = ThreadUiState::Loading;
        self.scroll_from_bottom = 0;
        self.generation
    }

    /// Keeps the thread open but invalidates every fetch started before now.
    pub fn supersede_fetches(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    pub fn close(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.other_user_email = None;
        self.messages.clear();
        self.ui_state = ThreadUiState::Empty;
        self.scroll_from_bottom = 0;
    }

    /// Replaces the whole list with server truth. Optimistic entries are
    /// dropped; the server copy of a sent message takes their place.
    pub fn replace_with_server(&mut self, messages: Vec<Message>) {
        self.messages = messages.into_iter().map(ThreadMessage::confirmed).collect();
        self.ui_state = ThreadUiState::Ready;
        let max = self.messages.len().saturating_sub(1);
        self.scroll_from_bottom = self.scroll_from_bottom.min(max);
    }

    pub fn set_error(&mut self) {
        if self.messages.is_empty() {
            self.ui_state = ThreadUiState::Error;
        }
    }

    pub fn push_pending(&mut self, message: ThreadMessage) {
        self.messages.push(message);
        self.scroll_from_bottom = 0;
        if self.ui_state != ThreadUiState::Ready {
            self.ui_state = ThreadUiState::Ready;
        }
    }

    /// Removes the optimistic entry with `local_id`, returning it tagged as
    /// failed. Returns `None` if a refetch already replaced it.
    pub fn roll_back(&mut self, local_id: &str) -> Option<ThreadMessage> {
        let index = self
            .messages
            .iter()
            .position(|message| message.id() == local_id)?;
        let mut removed = self.messages.remove(index);
        removed.delivery = DeliveryState::Failed;
        Some(removed)
    }

    pub fn pending_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| message.delivery == DeliveryState::Pending)
            .count()
    }

    pub fn scroll_up(&mut self) {
        let max = self.messages.len().saturating_sub(1);
        self.scroll_from_bottom = std::cmp::min(self.scroll_from_bottom + 1, max);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(1);
    }
}
