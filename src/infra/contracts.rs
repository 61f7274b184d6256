use crate::infra::error::AppError;

/// Persistent slot for the current user's email.
pub trait IdentityStorage: Send + Sync {
    fn read(&self) -> Result<Option<String>, AppError>;
    fn write(&self, email: &str) -> Result<(), AppError>;
    fn clear(&self) -> Result<(), AppError>;
}
