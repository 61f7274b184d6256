use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    api::RequestError,
    domain::{
        conversation::ConversationSummary,
        listing::{Listing, ListingDraft, ListingFilter, ListingPatch},
        message::Message,
        profile::{ProfilePatch, UserProfile},
    },
    usecases::{
        accounts::{AuthResponse, AuthSource, AuthenticatedUser, Credentials, Registration},
        list_conversations::ConversationsSource,
        listings::ListingsSource,
        load_messages::MessagesSource,
        mark_read::ReadMarker,
        profile::ProfileSource,
        send_message::MessageSender,
    },
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().expect("env lock should not be poisoned")
}

/// Backend operations the fake can count and be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FakeCall {
    ListConversations,
    LoadMessages,
    SendMessage,
    MarkRead,
    ListListings,
    CreateListing,
    FilterListings,
    GetListing,
    UpdateListing,
    DeleteListing,
    UserListings,
    Login,
    Register,
    GetProfile,
    UpdateProfile,
}

#[derive(Debug, Clone)]
struct StoredMessage {
    id: u64,
    sender: String,
    receiver: String,
    text: String,
    timestamp: DateTime<Utc>,
    read: bool,
}

impl StoredMessage {
    fn between(&self, left: &str, right: &str) -> bool {
        (same(&self.sender, left) && same(&self.receiver, right))
            || (same(&self.sender, right) && same(&self.receiver, left))
    }

    fn to_message(&self) -> Message {
        Message {
            id: self.id.to_string(),
            sender: self.sender.clone(),
            text: self.text.clone(),
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, Default)]
struct MarketState {
    clock: i64,
    next_id: u64,
    messages: Vec<StoredMessage>,
    listings: Vec<Listing>,
    users: BTreeMap<String, (String, UserProfile)>,
    failing: BTreeSet<FakeCall>,
    calls: Vec<FakeCall>,
}

impl MarketState {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        epoch() + Duration::seconds(self.clock)
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn listing_index(&self, id: &str) -> Result<usize, RequestError> {
        self.listings
            .iter()
            .position(|listing| listing.id.as_deref() == Some(id))
            .ok_or_else(|| not_found("Listing not found"))
    }
}

/// In-memory stand-in for the marketplace backend, shared by use case tests.
#[derive(Debug, Default)]
pub struct InMemoryMarketplace {
    state: Mutex<MarketState>,
    ignore_filters: bool,
    lagging_mark_read: bool,
}

impl InMemoryMarketplace {
    pub fn with_user(self, email: &str, password: &str) -> Self {
        self.lock().users.insert(
            email.to_ascii_lowercase(),
            (
                password.to_owned(),
                UserProfile {
                    email: email.to_owned(),
                    ..UserProfile::default()
                },
            ),
        );
        self
    }

    /// Makes `POST /listings/filter` return every listing, as a lax server would.
    pub fn ignoring_filters(mut self) -> Self {
        self.ignore_filters = true;
        self
    }

    /// Makes `mark_read` yield once before it applies, so a summaries fetch
    /// joined with it still sees the unread messages.
    pub fn with_lagging_mark_read(mut self) -> Self {
        self.lagging_mark_read = true;
        self
    }

    /// Stores a message directly, bypassing call counting.
    pub fn seed_message(&self, sender: &str, receiver: &str, text: &str) {
        let mut state = self.lock();
        let id = state.allocate_id();
        let timestamp = state.tick();
        state.messages.push(StoredMessage {
            id,
            sender: sender.to_owned(),
            receiver: receiver.to_owned(),
            text: text.to_owned(),
            timestamp,
            read: false,
        });
    }

    pub fn fail_on(&self, call: FakeCall) {
        self.lock().failing.insert(call);
    }

    pub fn recover(&self, call: FakeCall) {
        self.lock().failing.remove(&call);
    }

    pub fn calls(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn call_count(&self, call: FakeCall) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|recorded| **recorded == call)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, MarketState> {
        self.state.lock().expect("marketplace lock")
    }

    /// Records the call and returns the state, or the injected failure.
    fn enter(&self, call: FakeCall) -> Result<MutexGuard<'_, MarketState>, RequestError> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(&call) {
            return Err(RequestError::Status {
                status: 500,
                message: format!("{call:?} failed"),
            });
        }
        Ok(state)
    }
}

impl ConversationsSource for InMemoryMarketplace {
    async fn list_conversations(
        &self,
        user_email: &str,
    ) -> Result<Vec<ConversationSummary>, RequestError> {
        let state = self.enter(FakeCall::ListConversations)?;
        let mut by_counterpart: BTreeMap<String, ConversationSummary> = BTreeMap::new();

        for message in &state.messages {
            let other = if same(&message.sender, user_email) {
                &message.receiver
            } else if same(&message.receiver, user_email) {
                &message.sender
            } else {
                continue;
            };

            let entry = by_counterpart
                .entry(other.to_ascii_lowercase())
                .or_insert_with(|| ConversationSummary {
                    other_user_email: other.clone(),
                    last_message: String::new(),
                    last_timestamp: None,
                    unread_count: 0,
                });
            entry.last_message = message.text.clone();
            entry.last_timestamp = Some(message.timestamp);
            if same(&message.receiver, user_email) && !message.read {
                entry.unread_count += 1;
            }
        }

        Ok(by_counterpart.into_values().collect())
    }
}

impl MessagesSource for InMemoryMarketplace {
    async fn load_messages(
        &self,
        sender: &str,
        receiver: &str,
    ) -> Result<Vec<Message>, RequestError> {
        let state = self.enter(FakeCall::LoadMessages)?;
        Ok(state
            .messages
            .iter()
            .filter(|message| message.between(sender, receiver))
            .map(StoredMessage::to_message)
            .collect())
    }
}

impl MessageSender for InMemoryMarketplace {
    async fn send_message(
        &self,
        sender_email: &str,
        receiver_email: &str,
        text: &str,
    ) -> Result<Message, RequestError> {
        let mut state = self.enter(FakeCall::SendMessage)?;
        let id = state.allocate_id();
        let timestamp = state.tick();
        let stored = StoredMessage {
            id,
            sender: sender_email.to_owned(),
            receiver: receiver_email.to_owned(),
            text: text.to_owned(),
            timestamp,
            read: false,
        };
        let message = stored.to_message();
        state.messages.push(stored);
        Ok(message)
    }
}

impl ReadMarker for InMemoryMarketplace {
    async fn mark_read(
        &self,
        user_email: &str,
        other_user_email: &str,
    ) -> Result<(), RequestError> {
        if self.lagging_mark_read {
            tokio::task::yield_now().await;
        }
        let mut state = self.enter(FakeCall::MarkRead)?;
        for message in &mut state.messages {
            if same(&message.receiver, user_email) && same(&message.sender, other_user_email) {
                message.read = true;
            }
        }
        Ok(())
    }
}

impl ListingsSource for InMemoryMarketplace {
    async fn list_listings(&self) -> Result<Vec<Listing>, RequestError> {
        let state = self.enter(FakeCall::ListListings)?;
        Ok(state.listings.clone())
    }

    async fn create_listing(&self, draft: &ListingDraft) -> Result<Listing, RequestError> {
        let mut state = self.enter(FakeCall::CreateListing)?;
        let id = state.allocate_id();
        let created_at = state.tick();
        let listing = Listing {
            id: Some(id.to_string()),
            title: draft.title.clone(),
            price: Some(draft.price),
            address: draft.address.clone(),
            contact_name: draft.contact_name.clone(),
            contact_email: draft.contact_email.clone(),
            available_from: draft.available_from,
            available_to: draft.available_to,
            parking: draft.parking,
            furnished: Some(draft.furnished),
            notes: draft.notes.clone(),
            images: draft.images.clone(),
            created_at: Some(created_at),
        };
        state.listings.push(listing.clone());
        Ok(listing)
    }

    async fn filter_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RequestError> {
        let state = self.enter(FakeCall::FilterListings)?;
        Ok(state
            .listings
            .iter()
            .filter(|listing| self.ignore_filters || filter.matches(listing))
            .cloned()
            .collect())
    }

    async fn get_listing(&self, id: &str) -> Result<Listing, RequestError> {
        let state = self.enter(FakeCall::GetListing)?;
        let index = state.listing_index(id)?;
        Ok(state.listings[index].clone())
    }

    async fn update_listing(
        &self,
        id: &str,
        patch: &ListingPatch,
    ) -> Result<Listing, RequestError> {
        let mut state = self.enter(FakeCall::UpdateListing)?;
        let index = state.listing_index(id)?;
        let listing = &mut state.listings[index];

        if let Some(title) = &patch.title {
            listing.title = title.clone();
        }
        if let Some(price) = patch.price {
            listing.price = Some(price);
        }
        if let Some(address) = &patch.address {
            listing.address = address.clone();
        }
        if let Some(contact_name) = &patch.contact_name {
            listing.contact_name = contact_name.clone();
        }
        if let Some(contact_email) = &patch.contact_email {
            listing.contact_email = contact_email.clone();
        }
        listing.available_from = patch.available_from.or(listing.available_from);
        listing.available_to = patch.available_to.or(listing.available_to);
        listing.parking = patch.parking.or(listing.parking);
        listing.furnished = patch.furnished.or(listing.furnished);
        if let Some(notes) = &patch.notes {
            listing.notes = Some(notes.clone());
        }

        Ok(listing.clone())
    }

    async fn delete_listing(&self, id: &str) -> Result<(), RequestError> {
        let mut state = self.enter(FakeCall::DeleteListing)?;
        let index = state.listing_index(id)?;
        state.listings.remove(index);
        Ok(())
    }

    async fn user_listings(&self, email: &str) -> Result<Vec<Listing>, RequestError> {
        let state = self.enter(FakeCall::UserListings)?;
        Ok(state
            .listings
            .iter()
            .filter(|listing| same(&listing.contact_email, email))
            .cloned()
            .collect())
    }
}

impl AuthSource for InMemoryMarketplace {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, RequestError> {
        let state = self.enter(FakeCall::Login)?;
        match state.users.get(&credentials.email.to_ascii_lowercase()) {
            Some((password, profile)) if *password == credentials.password => {
                Ok(auth_response(&profile.email))
            }
            _ => Err(RequestError::Status {
                status: 401,
                message: "Invalid email or password".to_owned(),
            }),
        }
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, RequestError> {
        let mut state = self.enter(FakeCall::Register)?;
        let key = registration.email.to_ascii_lowercase();
        if state.users.contains_key(&key) {
            return Err(RequestError::Status {
                status: 409,
                message: "User already exists".to_owned(),
            });
        }

        let profile = UserProfile {
            email: registration.email.clone(),
            first_name: Some(registration.first_name.clone()),
            last_name: Some(registration.last_name.clone()),
            dob: registration.dob.clone(),
            gender: registration.gender.clone(),
            ..UserProfile::default()
        };
        state
            .users
            .insert(key, (registration.password.clone(), profile));
        Ok(auth_response(&registration.email))
    }
}

impl ProfileSource for InMemoryMarketplace {
    async fn get_profile(&self, email: &str) -> Result<UserProfile, RequestError> {
        let state = self.enter(FakeCall::GetProfile)?;
        state
            .users
            .get(&email.to_ascii_lowercase())
            .map(|(_, profile)| profile.clone())
            .ok_or_else(|| not_found("User not found"))
    }

    async fn update_profile(
        &self,
        email: &str,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, RequestError> {
        let mut state = self.enter(FakeCall::UpdateProfile)?;
        let (_, profile) = state
            .users
            .get_mut(&email.to_ascii_lowercase())
            .ok_or_else(|| not_found("User not found"))?;

        for (slot, value) in [
            (&mut profile.name, &patch.name),
            (&mut profile.phone, &patch.phone),
            (&mut profile.university, &patch.university),
            (&mut profile.bio, &patch.bio),
            (&mut profile.profilepic, &patch.profilepic),
        ] {
            if value.is_some() {
                *slot = value.clone();
            }
        }

        Ok(profile.clone())
    }
}

fn auth_response(email: &str) -> AuthResponse {
    AuthResponse {
        user: AuthenticatedUser {
            email: email.to_owned(),
        },
    }
}

fn not_found(message: &str) -> RequestError {
    RequestError::Status {
        status: 404,
        message: message.to_owned(),
    }
}

fn same(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .expect("valid epoch")
}
