use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const API_BASE_ENV: &str = "GATORKEYS_API_BASE";

/// Loads config as defaults, then the TOML file (if present), then the
/// environment override for the API base URL.
pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = AppConfig::default();

    if config_path.exists() {
        let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
            path: config_path.clone(),
            source,
        })?;

        let file_config: FileConfig =
            toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
                path: config_path.clone(),
                source,
            })?;

        file_config.merge_into(&mut config);
    }

    apply_env_overrides(&mut config);
    validate(&config).map_err(|details| AppError::ConfigInvalid {
        path: config_path,
        details,
    })?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), String> {
    if config.chat.poll_interval_ms == 0 {
        return Err("chat.poll_interval_ms must be greater than zero".to_owned());
    }
    if config.api.request_timeout_ms == 0 {
        return Err("api.request_timeout_ms must be greater than zero".to_owned());
    }
    Ok(())
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Some(base_url) = env::var(API_BASE_ENV)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
    {
        config.api.base_url = base_url;
    }
}
