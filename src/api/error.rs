use thiserror::Error;

/// Uniform failure of a backend call. `Display` is the single-line message
/// shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Non-2xx response; `message` is the server's own text when it sent one.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The request never produced a response (refused, timed out, DNS, ...).
    #[error("network error: {0}")]
    Network(String),
    /// 2xx response whose body does not have the expected shape.
    #[error("unexpected response from server: {0}")]
    Decode(String),
    /// The request could not be built (body not serializable, bad header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) | Self::InvalidRequest(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else if error.is_builder() {
            Self::InvalidRequest(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}
