use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::serde_compat;

/// Prefix of ids synthesized locally for optimistic messages.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// A message as the server stores it. The conversation it belongs to is not
/// encoded here; it is implied by the pair of emails used to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "serde_compat::id_string")]
    pub id: String,
    #[serde(alias = "sender_email")]
    pub sender: String,
    #[serde(alias = "body")]
    pub text: String,
    #[serde(deserialize_with = "serde_compat::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_ID_PREFIX)
    }
}

/// Delivery phase of a message shown in a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// Shown optimistically, send still in flight.
    Pending,
    /// Part of the authoritative list returned by the server.
    Confirmed,
    /// Send was rejected; the entry is on its way out of the thread.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub message: Message,
    pub delivery: DeliveryState,
}

impl ThreadMessage {
    pub fn confirmed(message: Message) -> Self {
        Self {
            message,
            delivery: DeliveryState::Confirmed,
        }
    }

    /// Builds the optimistic copy appended before the server has answered.
    pub fn pending(sender: &str, text: &str, timestamp: DateTime<Utc>, sequence: u64) -> Self {
        Self {
            message: Message {
                id: format!("{LOCAL_ID_PREFIX}{}-{sequence}", timestamp.timestamp_millis()),
                sender: sender.to_owned(),
                text: text.to_owned(),
                timestamp,
            },
            delivery: DeliveryState::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.message.id
    }

    pub fn is_outgoing(&self, current_email: &str) -> bool {
        self.message.sender.eq_ignore_ascii_case(current_email)
    }
}
