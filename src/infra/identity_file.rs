use std::{fs, io, path::PathBuf};

use crate::infra::{contracts::IdentityStorage, error::AppError};

#[derive(Debug, Clone)]
pub struct FileIdentityStorage {
    path: PathBuf,
}

impl FileIdentityStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn io_error(&self, source: io::Error) -> AppError {
        AppError::IdentityStorage {
            path: self.path.clone(),
            source,
        }
    }
}

impl IdentityStorage for FileIdentityStorage {
    fn read(&self) -> Result<Option<String>, AppError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let email = raw.trim();
                Ok((!email.is_empty()).then(|| email.to_owned()))
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(error)),
        }
    }

    fn write(&self, email: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        fs::write(&self.path, email).map_err(|source| self.io_error(source))
    }

    fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(error)),
        }
    }
}
