use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::serde_compat;

/// Latest activity between the current user and one counterpart.
///
/// Conversations have no id of their own; they are keyed by the
/// `(current user, other_user_email)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub other_user_email: String,
    #[serde(default)]
    pub last_message: String,
    #[serde(default, deserialize_with = "serde_compat::optional_timestamp")]
    pub last_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread_count: u32,
}

pub fn unread_total(conversations: &[ConversationSummary]) -> u32 {
    conversations
        .iter()
        .fold(0u32, |total, conversation| {
            total.saturating_add(conversation.unread_count)
        })
}
