//! Model descriptors: a registered table plus its exclusions and guards.

use crate::catalog;
use crate::error::{AppError, ConfigError};
use crate::extractors::RequestGuard;
use crate::model::ColumnDescriptor;
use axum::http::Method;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// Whether a form field feeds the WHERE clause or the SET/VALUES clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRole {
    Filter,
    Insert,
}

impl FieldRole {
    pub fn prefix(self) -> &'static str {
        match self {
            FieldRole::Filter => "filter_",
            FieldRole::Insert => "insert_",
        }
    }
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// POST creates, GET reads, PUT updates, DELETE deletes.
    pub fn from_method(method: &Method) -> Result<Self, AppError> {
        match *method {
            Method::POST => Ok(Operation::Create),
            Method::GET => Ok(Operation::Read),
            Method::PUT => Ok(Operation::Update),
            Method::DELETE => Ok(Operation::Delete),
            _ => Err(AppError::BadRequest(format!("unsupported method {}", method))),
        }
    }

    pub fn field_roles(self) -> &'static [FieldRole] {
        match self {
            Operation::Create => &[FieldRole::Insert],
            Operation::Read | Operation::Delete => &[FieldRole::Filter],
            Operation::Update => &[FieldRole::Filter, FieldRole::Insert],
        }
    }

    /// Message shown after a successful form submission.
    pub fn past_tense(self) -> &'static str {
        match self {
            Operation::Create => "created",
            Operation::Read => "read",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::InvalidOperation(s.to_string()))
    }
}

/// Strip a trailing operation suffix from an endpoint name.
///
/// `"email_address_delete"` becomes `"email_address"`; `"user"` is returned as is.
pub fn model_from_endpoint(endpoint: &str) -> &str {
    match endpoint.rsplit_once('_') {
        Some((model, op)) if op.parse::<Operation>().is_ok() => model,
        _ => endpoint,
    }
}

/// Visible columns of a model, derived fresh from the catalog.
#[derive(Clone, Debug, Default)]
pub struct ColumnSet {
    pub visible: Vec<ColumnDescriptor>,
    /// Excluded columns that are non-nullable.
    pub excluded_required: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    pub fn derive(model: &str, all: Vec<ColumnDescriptor>, excluded: &[String]) -> Self {
        let mut set = ColumnSet::default();
        for col in all {
            if !excluded.contains(&col.name) {
                set.visible.push(col);
            } else if !col.nullable() {
                tracing::debug!(model = %model, column = %col.name, "excluded required column");
                set.excluded_required.push(col);
            }
        }
        set
    }

    /// The primary-key column, when the table has exactly one.
    pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
        let mut pks = self.visible.iter().filter(|c| c.primary_key);
        match (pks.next(), pks.next()) {
            (Some(pk), None) => Some(pk),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.visible.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.visible.iter().map(|c| c.name.as_str())
    }

    /// Excluded required columns the database cannot fill on its own.
    pub fn blocking_create(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.excluded_required
            .iter()
            .filter(|c| !c.has_default() && !c.autoincrement)
    }
}

#[derive(Clone)]
pub struct ModelDescriptor {
    table: String,
    excluded_columns: Vec<String>,
    excluded_operations: Vec<Operation>,
    guards: Vec<Arc<dyn RequestGuard>>,
}

impl ModelDescriptor {
    pub fn new(
        table: impl Into<String>,
        excluded_columns: Vec<String>,
        excluded_operations: Vec<Operation>,
        guards: Vec<Arc<dyn RequestGuard>>,
    ) -> Self {
        ModelDescriptor {
            table: table.into(),
            excluded_columns,
            excluded_operations,
            guards,
        }
    }

    pub fn name(&self) -> &str {
        &self.table
    }

    pub fn excluded_columns(&self) -> &[String] {
        &self.excluded_columns
    }

    pub fn guards(&self) -> &[Arc<dyn RequestGuard>] {
        &self.guards
    }

    pub fn operations(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| !self.excluded_operations.contains(op))
            .collect()
    }

    pub fn allows(&self, op: Operation) -> bool {
        !self.excluded_operations.contains(&op)
    }

    pub fn operation(&self, op: Operation) -> ModelOperation<'_> {
        ModelOperation { model: self, operation: op }
    }

    /// Columns from live metadata; never cached.
    pub async fn columns(&self, pool: &SqlitePool) -> Result<ColumnSet, AppError> {
        let all = catalog::describe(pool, &self.table).await?;
        Ok(ColumnSet::derive(&self.table, all, &self.excluded_columns))
    }
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("table", &self.table)
            .field("excluded_columns", &self.excluded_columns)
            .field("excluded_operations", &self.excluded_operations)
            .field("guards", &self.guards.len())
            .finish()
    }
}

/// A model paired with one of its operations; names routes and endpoints.
#[derive(Clone, Copy, Debug)]
pub struct ModelOperation<'a> {
    pub model: &'a ModelDescriptor,
    pub operation: Operation,
}

impl ModelOperation<'_> {
    pub fn route(&self) -> String {
        format!("{}/{}", self.model.name(), self.operation)
    }

    pub fn endpoint(&self) -> String {
        format!("{}_{}", self.model.name(), self.operation)
    }

    pub fn endpoint_with(&self, admin_name: &str) -> String {
        format!("{}.{}", admin_name, self.endpoint())
    }
}
