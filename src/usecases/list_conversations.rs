use std::future::Future;

use thiserror::Error;

use crate::{api::RequestError, domain::conversation::ConversationSummary};

pub trait ConversationsSource {
    fn list_conversations(
        &self,
        user_email: &str,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>, RequestError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListConversationsError {
    #[error("log in to see your messages")]
    NotLoggedIn,
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Fetches the user's conversations, most recent activity first.
pub async fn list_conversations<S: ConversationsSource>(
    source: &S,
    user_email: &str,
) -> Result<Vec<ConversationSummary>, ListConversationsError> {
    let user_email = user_email.trim();
    if user_email.is_empty() {
        return Err(ListConversationsError::NotLoggedIn);
    }

    let mut conversations = source.list_conversations(user_email).await?;
    // Stable, so conversations without a timestamp keep the server order at the end.
    conversations.sort_by(|left, right| right.last_timestamp.cmp(&left.last_timestamp));

    Ok(conversations)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};

    use super::*;

    struct StubSource {
        result: Result<Vec<ConversationSummary>, RequestError>,
        captured_email: Mutex<Option<String>>,
    }

    impl StubSource {
        fn with_result(result: Result<Vec<ConversationSummary>, RequestError>) -> Self {
            Self {
                result,
                captured_email: Mutex::new(None),
            }
        }
    }

    impl ConversationsSource for StubSource {
        async fn list_conversations(
            &self,
            user_email: &str,
        ) -> Result<Vec<ConversationSummary>, RequestError> {
            *self.captured_email.lock().expect("email lock") = Some(user_email.to_owned());
            self.result.clone()
        }
    }

    fn summary(email: &str, minute: Option<u32>) -> ConversationSummary {
        ConversationSummary {
            other_user_email: email.to_owned(),
            last_message: "hey".to_owned(),
            last_timestamp: minute.map(|minute| {
                Utc.with_ymd_and_hms(2025, 1, 1, 12, minute, 0)
                    .single()
                    .expect("valid time")
            }),
            unread_count: 0,
        }
    }

    #[tokio::test]
    async fn rejects_blank_user_without_calling_source() {
        let source = StubSource::with_result(Ok(vec![]));

        let error = list_conversations(&source, "  ").await.expect_err("must fail");

        assert_eq!(error, ListConversationsError::NotLoggedIn);
        assert!(source.captured_email.lock().expect("email lock").is_none());
    }

    #[tokio::test]
    async fn orders_newest_first_with_undated_last() {
        let source = StubSource::with_result(Ok(vec![
            summary("old@ufl.edu", Some(1)),
            summary("undated@ufl.edu", None),
            summary("new@ufl.edu", Some(30)),
        ]));

        let conversations = list_conversations(&source, "a@ufl.edu")
            .await
            .expect("list should succeed");

        let order: Vec<_> = conversations
            .iter()
            .map(|item| item.other_user_email.as_str())
            .collect();
        assert_eq!(order, vec!["new@ufl.edu", "old@ufl.edu", "undated@ufl.edu"]);
    }

    #[tokio::test]
    async fn passes_trimmed_email_and_maps_request_errors() {
        let source = StubSource::with_result(Err(RequestError::Network("refused".to_owned())));

        let error = list_conversations(&source, " a@ufl.edu ")
            .await
            .expect_err("must fail");

        assert_eq!(
            *source.captured_email.lock().expect("email lock"),
            Some("a@ufl.edu".to_owned())
        );
        assert_eq!(error.to_string(), "network error: refused");
    }
}
