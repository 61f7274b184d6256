//! Sending one message from the current user to a counterpart.

use std::future::Future;

use thiserror::Error;

use crate::{api::RequestError, domain::message::Message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageCommand {
    pub sender_email: String,
    pub receiver_email: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("recipient email is required")]
    MissingRecipient,
    #[error("you cannot message yourself")]
    SelfRecipient,
    #[error(transparent)]
    Request(#[from] RequestError),
}

pub trait MessageSender {
    /// Stores the message on the server and returns the created record.
    fn send_message(
        &self,
        sender_email: &str,
        receiver_email: &str,
        text: &str,
    ) -> impl Future<Output = Result<Message, RequestError>> + Send;
}

/// Validates the command (trimmed text and recipient must be non-empty) and
/// delegates to the `MessageSender`.
pub async fn send_message<S: MessageSender>(
    sender: &S,
    command: SendMessageCommand,
) -> Result<Message, SendMessageError> {
    let text = command.text.trim();
    if text.is_empty() {
        return Err(SendMessageError::EmptyMessage);
    }

    let receiver = command.receiver_email.trim();
    if receiver.is_empty() {
        return Err(SendMessageError::MissingRecipient);
    }

    let sender_email = command.sender_email.trim();
    if sender_email.eq_ignore_ascii_case(receiver) {
        return Err(SendMessageError::SelfRecipient);
    }

    Ok(sender.send_message(sender_email, receiver, text).await?)
}
