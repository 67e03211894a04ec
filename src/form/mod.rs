//! Form synthesis: per-operation input forms whose fields mirror a model's columns.
//!
//! Field names carry their role: `filter_<column>` feeds the WHERE clause and
//! `insert_<column>` feeds SET/VALUES. Create uses insert fields only, read and
//! delete use filter fields only, update uses both.

mod coerce;

pub use coerce::{coerce, DATETIME_STORAGE_FORMAT};

use crate::model::{ColumnDescriptor, ColumnSet, FieldRole, ModelDescriptor, Operation};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name -> error messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(pub BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: String,
    pub role: FieldRole,
    pub column: ColumnDescriptor,
    pub required: bool,
    pub disabled: bool,
    pub placeholder: Option<&'static str>,
}

impl FieldSpec {
    fn new(column: &ColumnDescriptor, role: FieldRole, operation: Operation) -> Self {
        let disabled =
            operation == Operation::Create && role == FieldRole::Insert && column.autoincrement;
        let required = operation == Operation::Create
            && role == FieldRole::Insert
            && column.required
            && !column.has_default()
            && !column.autoincrement;
        FieldSpec {
            name: format!("{}{}", role.prefix(), column.name),
            role,
            column: column.clone(),
            required,
            disabled,
            placeholder: disabled.then_some("AUTOINCREMENT"),
        }
    }
}

/// Form structure for one model operation.
#[derive(Clone, Debug)]
pub struct FormSchema {
    pub model: String,
    pub operation: Operation,
    pub fields: Vec<FieldSpec>,
    /// Excluded required columns that make `create` impossible.
    pub blocked_by: Vec<String>,
}

impl FormSchema {
    pub fn synthesize(model: &ModelDescriptor, operation: Operation, columns: &ColumnSet) -> Self {
        let mut fields = Vec::new();
        for &role in operation.field_roles() {
            for column in &columns.visible {
                fields.push(FieldSpec::new(column, role, operation));
            }
        }
        let blocked_by = if operation == Operation::Create {
            columns.blocking_create().map(|c| c.name.clone()).collect()
        } else {
            Vec::new()
        };
        FormSchema {
            model: model.name().to_string(),
            operation,
            fields,
            blocked_by,
        }
    }

    pub fn fields_with_role(&self, role: FieldRole) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(move |f| f.role == role)
    }

    fn raw_values(&self, data: &[(String, String)]) -> BTreeMap<String, String> {
        let mut raw: BTreeMap<String, String> = BTreeMap::new();
        for (k, v) in data {
            if self.fields.iter().any(|f| &f.name == k) && !raw.contains_key(k) {
                raw.insert(k.clone(), v.clone());
            }
        }
        raw
    }

    /// Display-only form: keeps submitted strings, runs no validation.
    pub fn prefill(&self, data: &[(String, String)]) -> BoundForm {
        BoundForm {
            schema: self.clone(),
            raw: self.raw_values(data),
            values: BTreeMap::new(),
            errors: FormErrors::default(),
        }
    }

    /// Bind a raw request multi-map; the first value of a repeated key wins.
    pub fn bind(&self, data: &[(String, String)]) -> BoundForm {
        let raw = self.raw_values(data);

        let mut values = BTreeMap::new();
        let mut errors = FormErrors::default();
        for field in &self.fields {
            if field.disabled {
                continue;
            }
            let submitted = raw.get(&field.name).map(String::as_str).unwrap_or("");
            match coerce(field.column.value_type, submitted) {
                Ok(Some(v)) => {
                    values.insert(field.name.clone(), v);
                }
                Ok(None) if field.required => errors.add(&field.name, "This field is required."),
                Ok(None) => {}
                Err(msg) => errors.add(&field.name, msg),
            }
        }
        for col in &self.blocked_by {
            errors.add(
                format!("{}{}", FieldRole::Insert.prefix(), col),
                format!("column '{}' is excluded but required to create", col),
            );
        }

        BoundForm {
            schema: self.clone(),
            raw,
            values,
            errors,
        }
    }
}

/// Validated parameters for the CRUD executor, keyed by bare column name.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationParams {
    Create { insert: Map<String, Value> },
    Read { filter: Map<String, Value> },
    Update { filter: Map<String, Value>, insert: Map<String, Value> },
    Delete { filter: Map<String, Value> },
}

impl OperationParams {
    pub fn operation(&self) -> Operation {
        match self {
            OperationParams::Create { .. } => Operation::Create,
            OperationParams::Read { .. } => Operation::Read,
            OperationParams::Update { .. } => Operation::Update,
            OperationParams::Delete { .. } => Operation::Delete,
        }
    }
}

/// A form bound to one request's data.
#[derive(Clone, Debug)]
pub struct BoundForm {
    pub schema: FormSchema,
    raw: BTreeMap<String, String>,
    values: BTreeMap<String, Value>,
    errors: FormErrors,
}

impl BoundForm {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Raw submitted string for re-rendering.
    pub fn raw(&self, field: &str) -> Option<&str> {
        self.raw.get(field).map(String::as_str)
    }

    fn role_params(&self, role: FieldRole) -> Map<String, Value> {
        // Preserve column order rather than field-name order.
        self.schema
            .fields_with_role(role)
            .filter_map(|f| {
                self.values
                    .get(&f.name)
                    .map(|v| (f.column.name.clone(), v.clone()))
            })
            .collect()
    }

    /// Non-empty values split per role. Any field error rejects the whole form.
    pub fn params(&self) -> Result<OperationParams, FormErrors> {
        if !self.errors.is_empty() {
            return Err(self.errors.clone());
        }
        Ok(match self.schema.operation {
            Operation::Create => OperationParams::Create {
                insert: self.role_params(FieldRole::Insert),
            },
            Operation::Read => OperationParams::Read {
                filter: self.role_params(FieldRole::Filter),
            },
            Operation::Update => OperationParams::Update {
                filter: self.role_params(FieldRole::Filter),
                insert: self.role_params(FieldRole::Insert),
            },
            Operation::Delete => OperationParams::Delete {
                filter: self.role_params(FieldRole::Filter),
            },
        })
    }
}
