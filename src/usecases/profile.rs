use std::future::Future;

use reqwest::Url;
use thiserror::Error;

use crate::{
    api::RequestError,
    domain::profile::{ProfilePatch, UserProfile},
};

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

pub trait ProfileSource {
    fn get_profile(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<UserProfile, RequestError>> + Send;

    fn update_profile(
        &self,
        email: &str,
        patch: &ProfilePatch,
    ) -> impl Future<Output = Result<UserProfile, RequestError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("email is required")]
    MissingEmail,
    #[error("nothing to update")]
    EmptyPatch,
    #[error("profile picture must be an image URL (.jpg, .jpeg, .png, .gif or .webp)")]
    InvalidPictureUrl,
    #[error(transparent)]
    Request(#[from] RequestError),
}

pub async fn show_profile<S: ProfileSource>(
    source: &S,
    email: &str,
) -> Result<UserProfile, ProfileError> {
    let email = require_email(email)?;
    Ok(source.get_profile(email).await?)
}

pub async fn update_profile<S: ProfileSource>(
    source: &S,
    email: &str,
    patch: &ProfilePatch,
) -> Result<UserProfile, ProfileError> {
    let email = require_email(email)?;
    if patch.is_empty() {
        return Err(ProfileError::EmptyPatch);
    }
    if let Some(url) = patch.profilepic.as_deref() {
        if !is_image_url(url) {
            return Err(ProfileError::InvalidPictureUrl);
        }
    }

    Ok(source.update_profile(email, patch).await?)
}

/// Absolute http(s) URL whose path names an image file.
pub fn is_image_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw.trim()) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    let path = url.path().to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|extension| path.ends_with(extension))
}

fn require_email(email: &str) -> Result<&str, ProfileError> {
    let email = email.trim();
    if email.is_empty() {
        Err(ProfileError::MissingEmail)
    } else {
        Ok(email)
    }
}
