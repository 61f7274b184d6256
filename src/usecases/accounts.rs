use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{api::RequestError, infra::error::AppError};

use super::identity::IdentityStore;

const ACCOUNT_REGISTERED: &str = "ACCOUNT_REGISTERED";

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration payload as the server expects it.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

/// What the user typed into the sign-up form.
#[derive(Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<String>,
    pub gender: Option<String>,
}

/// `{ "user": { "email": ... } }` returned by both auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub user: AuthenticatedUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticatedUser {
    pub email: String,
}

pub trait AuthSource {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, RequestError>> + Send;

    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<AuthResponse, RequestError>> + Send;
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("email is required")]
    MissingEmail,
    #[error("password is required")]
    MissingPassword,
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("could not remember the login: {0}")]
    Storage(#[from] AppError),
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("could not remember the login: {0}")]
    Storage(#[from] AppError),
}

/// Checks the credentials with the server and remembers the returned email.
pub async fn login<S: AuthSource>(
    store: &IdentityStore,
    source: &S,
    email: &str,
    password: &str,
) -> Result<String, LoginError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(LoginError::MissingEmail);
    }
    if password.is_empty() {
        return Err(LoginError::MissingPassword);
    }

    let credentials = Credentials {
        email: email.to_owned(),
        password: password.to_owned(),
    };
    let response = source.login(&credentials).await?;
    store.login(&response.user.email)?;

    Ok(response.user.email)
}

/// Creates the account, then logs in as the new user.
pub async fn register<S: AuthSource>(
    store: &IdentityStore,
    source: &S,
    form: RegisterForm,
) -> Result<String, RegisterError> {
    let registration = validate_form(form)?;
    let response = source.register(&registration).await?;
    store.login(&response.user.email)?;

    tracing::info!(code = ACCOUNT_REGISTERED, "account registered");
    Ok(response.user.email)
}

pub fn logout(store: &IdentityStore) -> Result<(), AppError> {
    store.logout()
}

pub fn whoami(store: &IdentityStore) -> Option<String> {
    store.current_email()
}

fn validate_form(form: RegisterForm) -> Result<Registration, RegisterError> {
    let required = [
        ("first name", form.first_name.trim()),
        ("last name", form.last_name.trim()),
        ("email", form.email.trim()),
        ("password", form.password.as_str()),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
        return Err(RegisterError::MissingField(*field));
    }
    if form.password != form.confirm_password {
        return Err(RegisterError::PasswordMismatch);
    }

    let optional = |value: Option<String>| {
        value
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    };

    Ok(Registration {
        email: form.email.trim().to_owned(),
        first_name: form.first_name.trim().to_owned(),
        last_name: form.last_name.trim().to_owned(),
        password: form.password,
        dob: optional(form.dob),
        gender: optional(form.gender),
    })
}
