/// Who is using the client. Identity is nothing more than an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated(String),
}

impl Identity {
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(email) => Some(email),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityState {
    /// Storage has not been read yet.
    #[default]
    Loading,
    Resolved(Identity),
}

impl IdentityState {
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Loading => None,
            Self::Resolved(identity) => identity.email(),
        }
    }
}
