//! Load admin config from a JSON file and the environment.

use crate::config::{validate, AdminConfig};
use crate::error::ConfigError;
use std::path::Path;

/// Env var overriding `AdminConfig::name`.
pub const NAME_ENV: &str = "MODEL_ADMIN_NAME";
/// Env var overriding `AdminConfig::url_prefix`.
pub const URL_PREFIX_ENV: &str = "MODEL_ADMIN_URL_PREFIX";

pub fn parse(json: &str) -> Result<AdminConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

/// Read and validate a JSON config file.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<AdminConfig, ConfigError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let config = parse(&text)?;
    validate(&config)?;
    Ok(config)
}

impl AdminConfig {
    /// Apply `MODEL_ADMIN_NAME` / `MODEL_ADMIN_URL_PREFIX` when set.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(name) = std::env::var(NAME_ENV) {
            self.name = name;
        }
        if let Ok(prefix) = std::env::var(URL_PREFIX_ENV) {
            self.url_prefix = prefix;
        }
        self
    }
}
