use super::message_input_state::MessageInputState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeField {
    #[default]
    Recipient,
    FirstMessage,
}

/// "New chat" sub-mode of the conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposeState {
    active: bool,
    focus: ComposeField,
    recipient: MessageInputState,
    first_message: MessageInputState,
}

impl ComposeState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn focus(&self) -> ComposeField {
        self.focus
    }

    pub fn recipient(&self) -> &MessageInputState {
        &self.recipient
    }

    pub fn first_message(&self) -> &MessageInputState {
        &self.first_message
    }

    pub fn recipient_email(&self) -> String {
        self.recipient.text().trim().to_owned()
    }

    pub fn first_message_text(&self) -> String {
        self.first_message.text().trim().to_owned()
    }

    pub fn begin(&mut self) {
        self.active = true;
        self.focus = ComposeField::Recipient;
    }

    /// Leaves the sub-mode and forgets whatever was typed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            ComposeField::Recipient => ComposeField::FirstMessage,
            ComposeField::FirstMessage => ComposeField::Recipient,
        };
    }

    pub fn focused_input_mut(&mut self) -> &mut MessageInputState {
        match self.focus {
            ComposeField::Recipient => &mut self.recipient,
            ComposeField::FirstMessage => &mut self.first_message,
        }
    }

    #[cfg(test)]
    pub fn fill(&mut self, recipient: &str, first_message: &str) {
        self.begin();
        self.recipient.set_text(recipient);
        self.first_message.set_text(first_message);
    }
}
