//! Raw config types matching the JSON admin config file.

use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "model_management";
pub const DEFAULT_URL_PREFIX: &str = "/model-management";

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_url_prefix() -> String {
    DEFAULT_URL_PREFIX.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    pub table: String,
    #[serde(default)]
    pub excluded_columns: Vec<String>,
    /// Operation names; parsed and checked by `validate`.
    #[serde(default)]
    pub excluded_operations: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Namespace for endpoint names and the page title.
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        AdminConfig {
            name: default_name(),
            url_prefix: default_url_prefix(),
            models: Vec::new(),
        }
    }
}
