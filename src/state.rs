//! Shared application state. The registry is fixed once the router is built.

use crate::model::{ModelDescriptor, ModelRegistry, Operation};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AdminSettings {
    pub name: String,
    pub url_prefix: String,
}

impl AdminSettings {
    /// Absolute path under the admin prefix; `path` must start with '/'.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.url_prefix, path)
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub pool: SqlitePool,
    pub registry: Arc<ModelRegistry>,
    pub settings: Arc<AdminSettings>,
}

/// State for the routes of one model.
#[derive(Clone)]
pub struct ModelState {
    pub app: AppState,
    pub model: Arc<ModelDescriptor>,
}

/// State for the form view of one model operation.
#[derive(Clone)]
pub struct OperationState {
    pub app: AppState,
    pub model: Arc<ModelDescriptor>,
    pub operation: Operation,
}
