//! Marketplace REST endpoints on top of [`HttpTransport`].

use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        conversation::ConversationSummary,
        listing::{Listing, ListingDraft, ListingFilter, ListingPatch},
        message::Message,
        profile::{ProfilePatch, UserProfile},
    },
    infra::{config::ApiConfig, error::AppError},
    usecases::{
        accounts::{AuthResponse, AuthSource, Credentials, Registration},
        list_conversations::ConversationsSource,
        listings::ListingsSource,
        load_messages::MessagesSource,
        mark_read::ReadMarker,
        profile::ProfileSource,
        send_message::MessageSender,
    },
};

use super::{
    error::RequestError,
    transport::{encode_segment, HttpTransport, RequestOptions},
};

#[derive(Debug, Serialize)]
struct NewMessageBody<'a> {
    sender_email: &'a str,
    receiver_email: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct MarkReadBody<'a> {
    user_email: &'a str,
    other_user_email: &'a str,
}

/// `POST /messages` answers with the created message, bare or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreatedMessage {
    Wrapped { message: Message },
    Bare(Message),
}

#[derive(Debug, Deserialize)]
struct UpdatedListing {
    listing: Listing,
}

#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    transport: HttpTransport,
}

impl MarketplaceClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }
}

impl ConversationsSource for MarketplaceClient {
    async fn list_conversations(
        &self,
        user_email: &str,
    ) -> Result<Vec<ConversationSummary>, RequestError> {
        self.transport
            .request(
                "/messages/conversations",
                RequestOptions::get().with_query("user_email", user_email),
            )
            .await
    }
}

impl MessagesSource for MarketplaceClient {
    async fn load_messages(
        &self,
        sender: &str,
        receiver: &str,
    ) -> Result<Vec<Message>, RequestError> {
        self.transport
            .request(
                "/messages",
                RequestOptions::get()
                    .with_query("sender", sender)
                    .with_query("receiver", receiver),
            )
            .await
    }
}

impl MessageSender for MarketplaceClient {
    async fn send_message(
        &self,
        sender_email: &str,
        receiver_email: &str,
        text: &str,
    ) -> Result<Message, RequestError> {
        let options = RequestOptions::post(&NewMessageBody {
            sender_email,
            receiver_email,
            text,
        })?;
        let created: CreatedMessage = self.transport.request("/messages", options).await?;

        Ok(match created {
            CreatedMessage::Wrapped { message } | CreatedMessage::Bare(message) => message,
        })
    }
}

impl ReadMarker for MarketplaceClient {
    async fn mark_read(
        &self,
        user_email: &str,
        other_user_email: &str,
    ) -> Result<(), RequestError> {
        let options = RequestOptions::put(&MarkReadBody {
            user_email,
            other_user_email,
        })?;
        self.transport.request_status("/messages/read", options).await
    }
}

impl ListingsSource for MarketplaceClient {
    async fn list_listings(&self) -> Result<Vec<Listing>, RequestError> {
        self.transport.request("/listings", RequestOptions::get()).await
    }

    async fn create_listing(&self, draft: &ListingDraft) -> Result<Listing, RequestError> {
        self.transport
            .request("/listings", RequestOptions::post(draft)?)
            .await
    }

    async fn filter_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RequestError> {
        self.transport
            .request("/listings/filter", RequestOptions::post(filter)?)
            .await
    }

    async fn get_listing(&self, id: &str) -> Result<Listing, RequestError> {
        self.transport
            .request(&listing_path(id), RequestOptions::get())
            .await
    }

    async fn update_listing(
        &self,
        id: &str,
        patch: &ListingPatch,
    ) -> Result<Listing, RequestError> {
        let updated: UpdatedListing = self
            .transport
            .request(&listing_path(id), RequestOptions::put(patch)?)
            .await?;
        Ok(updated.listing)
    }

    async fn delete_listing(&self, id: &str) -> Result<(), RequestError> {
        self.transport
            .request_status(&listing_path(id), RequestOptions::delete())
            .await
    }

    async fn user_listings(&self, email: &str) -> Result<Vec<Listing>, RequestError> {
        let path = format!("/listings/user/{}", encode_segment(email));
        self.transport.request(&path, RequestOptions::get()).await
    }
}

impl AuthSource for MarketplaceClient {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, RequestError> {
        self.transport
            .request("/auth/login", RequestOptions::post(credentials)?)
            .await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, RequestError> {
        self.transport
            .request("/auth/register", RequestOptions::post(registration)?)
            .await
    }
}

impl ProfileSource for MarketplaceClient {
    async fn get_profile(&self, email: &str) -> Result<UserProfile, RequestError> {
        self.transport
            .request(&user_path(email), RequestOptions::get())
            .await
    }

    async fn update_profile(
        &self,
        email: &str,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, RequestError> {
        self.transport
            .request(&user_path(email), RequestOptions::put(patch)?)
            .await
    }
}

fn listing_path(id: &str) -> String {
    format!("/listings/{}", encode_segment(id))
}

fn user_path(email: &str) -> String {
    format!("/users/{}", encode_segment(email))
}
