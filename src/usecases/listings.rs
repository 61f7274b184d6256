//! Housing listings: browse, search, create, edit, delete and ownership.

use std::future::Future;

use thiserror::Error;

use crate::{
    api::RequestError,
    domain::listing::{Listing, ListingDraft, ListingFilter, ListingPatch},
};

const LISTING_DELETED: &str = "LISTING_DELETED";

pub trait ListingsSource {
    fn list_listings(&self) -> impl Future<Output = Result<Vec<Listing>, RequestError>> + Send;

    fn create_listing(
        &self,
        draft: &ListingDraft,
    ) -> impl Future<Output = Result<Listing, RequestError>> + Send;

    fn filter_listings(
        &self,
        filter: &ListingFilter,
    ) -> impl Future<Output = Result<Vec<Listing>, RequestError>> + Send;

    fn get_listing(&self, id: &str) -> impl Future<Output = Result<Listing, RequestError>> + Send;

    fn update_listing(
        &self,
        id: &str,
        patch: &ListingPatch,
    ) -> impl Future<Output = Result<Listing, RequestError>> + Send;

    fn delete_listing(&self, id: &str) -> impl Future<Output = Result<(), RequestError>> + Send;

    fn user_listings(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Vec<Listing>, RequestError>> + Send;
}

/// Problems with listing input, detected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("contact email is required")]
    MissingContactEmail,
    #[error("price must be zero or more")]
    NegativePrice,
    #[error("availability must not end before it starts")]
    InvalidDateRange,
    #[error("listing id is required")]
    MissingId,
    #[error("nothing to update")]
    EmptyPatch,
    #[error("email is required")]
    MissingEmail,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingsError {
    #[error(transparent)]
    Validation(#[from] ListingValidationError),
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Outcome of a lookup by id; a missing listing is an expected answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingLookup {
    Found(Box<Listing>),
    NotFound,
}

/// All listings, newest first. Listings without a creation time keep the
/// server order after the dated ones.
pub async fn list_listings<S: ListingsSource>(source: &S) -> Result<Vec<Listing>, ListingsError> {
    let mut listings = source.list_listings().await?;
    sort_newest_first(&mut listings);
    Ok(listings)
}

pub async fn create_listing<S: ListingsSource>(
    source: &S,
    draft: ListingDraft,
) -> Result<Listing, ListingsError> {
    let draft = validate_draft(draft)?;
    let listing = source.create_listing(&draft).await?;

    tracing::info!(listing_id = ?listing.id, "listing created");
    Ok(listing)
}

/// Runs the search on the server and re-applies the same criteria locally,
/// so the result never contains a listing the filter rejects.
pub async fn filter_listings<S: ListingsSource>(
    source: &S,
    filter: &ListingFilter,
) -> Result<Vec<Listing>, ListingsError> {
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        if end < start {
            return Err(ListingValidationError::InvalidDateRange.into());
        }
    }

    let mut listings = source.filter_listings(filter).await?;
    listings.retain(|listing| filter.matches(listing));
    sort_newest_first(&mut listings);
    Ok(listings)
}

pub async fn get_listing<S: ListingsSource>(
    source: &S,
    id: &str,
) -> Result<ListingLookup, ListingsError> {
    let id = require_id(id)?;

    match source.get_listing(id).await {
        Ok(listing) => Ok(ListingLookup::Found(Box::new(listing))),
        Err(error) if error.is_not_found() => Ok(ListingLookup::NotFound),
        Err(error) => Err(error.into()),
    }
}

pub async fn update_listing<S: ListingsSource>(
    source: &S,
    id: &str,
    patch: &ListingPatch,
) -> Result<Listing, ListingsError> {
    let id = require_id(id)?;
    if patch.is_empty() {
        return Err(ListingValidationError::EmptyPatch.into());
    }
    if patch.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        return Err(ListingValidationError::MissingTitle.into());
    }
    if patch.price.is_some_and(|price| price < 0.0) {
        return Err(ListingValidationError::NegativePrice.into());
    }
    check_date_range(patch.available_from, patch.available_to)?;

    Ok(source.update_listing(id, patch).await?)
}

pub async fn delete_listing<S: ListingsSource>(source: &S, id: &str) -> Result<(), ListingsError> {
    let id = require_id(id)?;
    source.delete_listing(id).await?;

    tracing::info!(code = LISTING_DELETED, listing_id = id, "listing deleted");
    Ok(())
}

pub async fn user_listings<S: ListingsSource>(
    source: &S,
    email: &str,
) -> Result<Vec<Listing>, ListingsError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ListingValidationError::MissingEmail.into());
    }

    let mut listings = source.user_listings(email).await?;
    sort_newest_first(&mut listings);
    Ok(listings)
}

/// A user owns a listing when it belongs to their listing set on the server.
pub async fn owns_listing<S: ListingsSource>(
    source: &S,
    email: &str,
    id: &str,
) -> Result<bool, ListingsError> {
    let id = require_id(id)?;
    let listings = user_listings(source, email).await?;

    Ok(listings
        .iter()
        .any(|listing| listing.id.as_deref() == Some(id)))
}

fn validate_draft(mut draft: ListingDraft) -> Result<ListingDraft, ListingValidationError> {
    draft.title = draft.title.trim().to_owned();
    draft.contact_email = draft.contact_email.trim().to_owned();

    if draft.title.is_empty() {
        return Err(ListingValidationError::MissingTitle);
    }
    if draft.contact_email.is_empty() {
        return Err(ListingValidationError::MissingContactEmail);
    }
    if !draft.price.is_finite() || draft.price < 0.0 {
        return Err(ListingValidationError::NegativePrice);
    }
    check_date_range(draft.available_from, draft.available_to)?;

    Ok(draft)
}

fn check_date_range(
    from: Option<chrono::NaiveDate>,
    to: Option<chrono::NaiveDate>,
) -> Result<(), ListingValidationError> {
    match (from, to) {
        (Some(from), Some(to)) if to < from => Err(ListingValidationError::InvalidDateRange),
        _ => Ok(()),
    }
}

fn require_id(id: &str) -> Result<&str, ListingValidationError> {
    let id = id.trim();
    if id.is_empty() {
        Err(ListingValidationError::MissingId)
    } else {
        Ok(id)
    }
}

fn sort_newest_first(listings: &mut [Listing]) {
    listings.sort_by(|left, right| right.created_at.cmp(&left.created_at));
}
