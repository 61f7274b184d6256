//! Process-wide record of who is logged in.
//!
//! The store is constructed once by bootstrap and shared by `Arc`. It starts in
//! [`IdentityState::Loading`] and only resolves after [`IdentityStore::init`]
//! has read the storage slot. There is no network validation: whatever email
//! the slot holds is trusted.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    domain::identity::{Identity, IdentityState},
    infra::{contracts::IdentityStorage, error::AppError},
};

const IDENTITY_READ_FAILED: &str = "IDENTITY_READ_FAILED";
const IDENTITY_RESOLVED: &str = "IDENTITY_RESOLVED";
const IDENTITY_LOGGED_IN: &str = "IDENTITY_LOGGED_IN";
const IDENTITY_LOGGED_OUT: &str = "IDENTITY_LOGGED_OUT";

pub struct IdentityStore {
    storage: Box<dyn IdentityStorage>,
    state: RwLock<IdentityState>,
}

impl std::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityStore")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl IdentityStore {
    pub fn new(storage: Box<dyn IdentityStorage>) -> Self {
        Self {
            storage,
            state: RwLock::new(IdentityState::Loading),
        }
    }

    /// Reads the storage slot once and resolves. An unreadable slot resolves
    /// anonymous rather than failing startup.
    pub fn init(&self) -> Identity {
        let identity = match self.storage.read() {
            Ok(Some(email)) => Identity::Authenticated(email),
            Ok(None) => Identity::Anonymous,
            Err(error) => {
                tracing::warn!(
                    code = IDENTITY_READ_FAILED,
                    error = %error,
                    "stored identity unreadable; continuing anonymous"
                );
                Identity::Anonymous
            }
        };

        tracing::info!(
            code = IDENTITY_RESOLVED,
            authenticated = identity.email().is_some(),
            "identity resolved"
        );
        *self.write_state() = IdentityState::Resolved(identity.clone());
        identity
    }

    pub fn login(&self, email: &str) -> Result<(), AppError> {
        let email = email.trim();
        self.storage.write(email)?;
        *self.write_state() = IdentityState::Resolved(Identity::Authenticated(email.to_owned()));

        tracing::info!(code = IDENTITY_LOGGED_IN, "identity stored");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), AppError> {
        self.storage.clear()?;
        *self.write_state() = IdentityState::Resolved(Identity::Anonymous);

        tracing::info!(code = IDENTITY_LOGGED_OUT, "identity cleared");
        Ok(())
    }

    /// Back to `Loading`; nobody is reported logged in until `init` runs again.
    pub fn teardown(&self) {
        *self.write_state() = IdentityState::Loading;
    }

    pub fn state(&self) -> IdentityState {
        self.read_state().clone()
    }

    pub fn current_email(&self) -> Option<String> {
        self.read_state().email().map(str::to_owned)
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.read_state(), IdentityState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().email().is_some()
    }

    // A panic while holding the lock cannot leave the state half-written.
    fn read_state(&self) -> RwLockReadGuard<'_, IdentityState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, IdentityState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
