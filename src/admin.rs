//! The admin builder: register models, then build the router.

use crate::catalog;
use crate::config::{validate_prefix, AdminConfig, DEFAULT_NAME, DEFAULT_URL_PREFIX};
use crate::error::{AppError, ConfigError};
use crate::extractors::RequestGuard;
use crate::model::{ModelDescriptor, ModelRegistry, Operation};
use crate::routes::{admin_routes, common_routes};
use crate::state::{AdminSettings, AppState};
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Request body cap for form and API submissions.
pub const BODY_LIMIT: usize = 1024 * 1024;

/// Paths owned by the operational routes; a table may not shadow them under an empty prefix.
const ROOT_PATHS: [&str; 3] = ["health", "ready", "version"];

/// A table name must be usable as a single literal path segment.
fn check_table_name(table: &str, url_prefix: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::Validation(format!("table name '{}' {}", table, reason));
    if table.is_empty() || table.contains(['/', '?', '#']) || table.starts_with([':', '*']) {
        return Err(invalid("is not a plain path segment"));
    }
    if table == "api" {
        return Err(invalid("collides with the api route"));
    }
    if url_prefix.is_empty() && ROOT_PATHS.contains(&table) {
        return Err(invalid("collides with an operational route under an empty prefix"));
    }
    Ok(())
}

/// One table to expose, with its exclusions and guards.
#[derive(Clone)]
pub struct ModelRegistration {
    table: String,
    excluded_columns: Vec<String>,
    excluded_operations: Vec<Operation>,
    guards: Vec<Arc<dyn RequestGuard>>,
}

impl ModelRegistration {
    pub fn new(table: impl Into<String>) -> Self {
        ModelRegistration {
            table: table.into(),
            excluded_columns: Vec::new(),
            excluded_operations: Vec::new(),
            guards: Vec::new(),
        }
    }

    pub fn exclude_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn exclude_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        for op in operations {
            if !self.excluded_operations.contains(&op) {
                self.excluded_operations.push(op);
            }
        }
        self
    }

    /// Guards run in the order they are added.
    pub fn guard(mut self, guard: impl RequestGuard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    fn into_descriptor(self) -> ModelDescriptor {
        ModelDescriptor::new(
            self.table,
            self.excluded_columns,
            self.excluded_operations,
            self.guards,
        )
    }
}

pub struct ModelAdmin {
    name: String,
    url_prefix: String,
    models: Vec<ModelRegistration>,
}

impl Default for ModelAdmin {
    fn default() -> Self {
        ModelAdmin {
            name: DEFAULT_NAME.to_string(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            models: Vec::new(),
        }
    }
}

impl ModelAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Empty, or starting with '/' and without a trailing '/'.
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn register_model(mut self, model: ModelRegistration) -> Self {
        self.models.push(model);
        self
    }

    /// Builder from a validated config file. Operation names are parsed here.
    pub fn from_config(config: &AdminConfig) -> Result<Self, ConfigError> {
        let mut admin = ModelAdmin::new()
            .name(config.name.clone())
            .url_prefix(config.url_prefix.clone());
        for m in &config.models {
            let ops = m
                .excluded_operations
                .iter()
                .map(|s| s.parse::<Operation>())
                .collect::<Result<Vec<_>, _>>()?;
            admin = admin.register_model(
                ModelRegistration::new(m.table.clone())
                    .exclude_columns(m.excluded_columns.iter().cloned())
                    .exclude_operations(ops),
            );
        }
        Ok(admin)
    }

    /// Check settings, confirm every table exists, and resolve the registry.
    pub async fn build(self, pool: SqlitePool) -> Result<AppState, AppError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation("name must not be empty".into()).into());
        }
        validate_prefix(&self.url_prefix)?;

        let mut registry = ModelRegistry::default();
        for m in self.models {
            check_table_name(&m.table, &self.url_prefix)?;
            if !catalog::table_exists(&pool, &m.table).await? {
                return Err(ConfigError::MissingReference {
                    kind: "table",
                    id: m.table,
                }
                .into());
            }
            let model = m.into_descriptor();
            let columns = model.columns(&pool).await?;
            for col in &columns.excluded_required {
                tracing::warn!(
                    model = %model.name(),
                    column = %col.name,
                    "excluded column is non-nullable and therefore required; 'create' will fail without it"
                );
            }
            let table = model.name().to_string();
            if !registry.insert(model) {
                return Err(ConfigError::DuplicateModel(table).into());
            }
        }
        if registry.is_empty() {
            tracing::warn!(name = %self.name, "no models registered");
        }

        Ok(AppState {
            pool,
            registry: Arc::new(registry),
            settings: Arc::new(AdminSettings {
                name: self.name,
                url_prefix: self.url_prefix,
            }),
        })
    }

    /// Admin routes plus `/health`, `/ready` and `/version`, with tracing and a body limit.
    pub async fn router(self, pool: SqlitePool) -> Result<Router, AppError> {
        let state = self.build(pool).await?;
        tracing::info!(
            name = %state.settings.name,
            prefix = %state.settings.url_prefix,
            models = state.registry.models().len(),
            "model admin ready"
        );
        Ok(Router::new()
            .merge(common_routes(state.clone()))
            .merge(admin_routes(state))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestBodyLimitLayer::new(BODY_LIMIT)),
            ))
    }
}
