//! Model admin: an auto-generated CRUD interface (HTML forms and a JSON API) for
//! SQLite tables, driven by live catalog metadata.

pub mod admin;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extractors;
pub mod form;
pub mod handlers;
pub mod model;
pub mod render;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use admin::{ModelAdmin, ModelRegistration};
pub use config::{load_from_path, AdminConfig, ModelConfig};
pub use error::{AppError, ConfigError, CrudFailure};
pub use extractors::{HeaderGuard, RequestGuard};
pub use model::{ColumnDescriptor, ModelDescriptor, Operation, ValueType};
pub use routes::{admin_routes, common_routes};
pub use service::CrudExecutor;
pub use state::AppState;
pub use store::{connect, memory_pool};
