use std::sync::{Arc, Mutex};

use crate::infra::{contracts::IdentityStorage, error::AppError};

/// In-memory slot. Clones share the slot, so a test can keep one to inspect
/// what the store wrote.
#[derive(Debug, Default, Clone)]
pub struct MemoryIdentityStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryIdentityStorage {
    pub fn with_email(email: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(email.to_owned()))),
        }
    }

    pub fn stored(&self) -> Option<String> {
        self.slot.lock().expect("slot lock").clone()
    }
}

impl IdentityStorage for MemoryIdentityStorage {
    fn read(&self) -> Result<Option<String>, AppError> {
        Ok(self.stored())
    }

    fn write(&self, email: &str) -> Result<(), AppError> {
        *self.slot.lock().expect("slot lock") = Some(email.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        *self.slot.lock().expect("slot lock") = None;
        Ok(())
    }
}

/// Storage whose every operation fails, for exercising error paths.
#[derive(Debug, Default)]
pub struct BrokenIdentityStorage;

impl BrokenIdentityStorage {
    fn error() -> AppError {
        AppError::IdentityStorage {
            path: "broken".into(),
            source: std::io::Error::other("storage unavailable"),
        }
    }
}

impl IdentityStorage for BrokenIdentityStorage {
    fn read(&self) -> Result<Option<String>, AppError> {
        Err(Self::error())
    }

    fn write(&self, _email: &str) -> Result<(), AppError> {
        Err(Self::error())
    }

    fn clear(&self) -> Result<(), AppError> {
        Err(Self::error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trips_the_slot() {
        let storage = MemoryIdentityStorage::default();

        storage.write("albert@ufl.edu").expect("write");
        assert_eq!(storage.read().expect("read"), Some("albert@ufl.edu".to_owned()));

        storage.clear().expect("clear");
        assert_eq!(storage.read().expect("read"), None);
    }
}
