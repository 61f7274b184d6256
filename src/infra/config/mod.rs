mod app_config;
mod file_config;
mod loader;

pub use app_config::{ApiConfig, AppConfig, ChatConfig, LogConfig};
pub use loader::{load, API_BASE_ENV};
