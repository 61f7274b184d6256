use std::future::Future;

use crate::api::RequestError;

pub trait ReadMarker {
    /// Marks every message from `other_user_email` to `user_email` as read.
    fn mark_read(
        &self,
        user_email: &str,
        other_user_email: &str,
    ) -> impl Future<Output = Result<(), RequestError>> + Send;
}
