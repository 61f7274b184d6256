use std::future::Future;

use thiserror::Error;

use crate::{api::RequestError, domain::message::Message};

/// Identifies a conversation by its two participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationKey {
    pub user_email: String,
    pub other_user_email: String,
}

impl ConversationKey {
    pub fn new(user_email: &str, other_user_email: &str) -> Self {
        Self {
            user_email: user_email.trim().to_owned(),
            other_user_email: other_user_email.trim().to_owned(),
        }
    }
}

pub trait MessagesSource {
    fn load_messages(
        &self,
        sender: &str,
        receiver: &str,
    ) -> impl Future<Output = Result<Vec<Message>, RequestError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadMessagesError {
    #[error("both participants are required to load a conversation")]
    MissingParticipant,
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Loads the full message list between the two participants, oldest first.
pub async fn load_messages<S: MessagesSource>(
    source: &S,
    key: &ConversationKey,
) -> Result<Vec<Message>, LoadMessagesError> {
    if key.user_email.is_empty() || key.other_user_email.is_empty() {
        return Err(LoadMessagesError::MissingParticipant);
    }

    let mut messages = source
        .load_messages(&key.user_email, &key.other_user_email)
        .await?;
    messages.sort_by(|left, right| left.timestamp.cmp(&right.timestamp));

    Ok(messages)
}
