use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config at {path}: {details}")]
    ConfigInvalid { path: PathBuf, details: String },
    #[error("failed to initialize logging: {0}")]
    LoggingInit(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("failed to resolve storage paths: {details}")]
    StoragePathResolution { details: String },
    #[error("failed to create storage directory at {path}: {source}")]
    StorageDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to access identity file at {path}: {source}")]
    IdentityStorage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
