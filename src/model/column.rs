//! Column descriptors derived from catalog metadata.

use serde::Serialize;
use std::fmt;

/// Semantic value type of a column, inferred from its declared SQL type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Int,
    Bool,
    Float,
    Decimal,
    Date,
    DateTime,
}

impl ValueType {
    /// SQLite affinity rules, with the narrower types checked first.
    pub fn from_sql_type(declared: &str) -> Self {
        let t = declared.trim().to_ascii_uppercase();
        if t.starts_with("BOOL") {
            ValueType::Bool
        } else if t.contains("DATETIME") || t.contains("TIMESTAMP") {
            ValueType::DateTime
        } else if t.starts_with("DATE") {
            ValueType::Date
        } else if t.contains("INT") {
            ValueType::Int
        } else if t.contains("CHAR") || t.contains("CLOB") || t.contains("TEXT") {
            ValueType::String
        } else if t.contains("REAL") || t.contains("FLOA") || t.contains("DOUB") {
            ValueType::Float
        } else if t.starts_with("NUMERIC") || t.starts_with("DECIMAL") {
            ValueType::Decimal
        } else {
            ValueType::String
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "str",
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::Float => "float",
            ValueType::Decimal => "decimal",
            ValueType::Date => "date",
            ValueType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of `pragma_table_info`.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct RawColumn {
    pub name: String,
    #[sqlx(rename = "type")]
    pub sql_type: String,
    #[sqlx(rename = "notnull")]
    pub not_null: i64,
    pub dflt_value: Option<String>,
    /// 1-based position in the primary key, 0 when not part of it.
    pub pk: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub sql_type: String,
    pub value_type: ValueType,
    pub required: bool,
    pub default: Option<String>,
    pub primary_key: bool,
    pub foreign_key: bool,
    pub autoincrement: bool,
}

impl ColumnDescriptor {
    /// Build from a catalog row. `foreign_keys` are the table's FK source columns,
    /// `pk_count` the number of primary-key columns on the table.
    pub fn from_catalog(raw: &RawColumn, foreign_keys: &[String], pk_count: usize) -> Self {
        let primary_key = raw.pk > 0;
        // A lone INTEGER PRIMARY KEY aliases the rowid.
        let autoincrement =
            primary_key && pk_count == 1 && raw.sql_type.trim().eq_ignore_ascii_case("INTEGER");
        ColumnDescriptor {
            name: raw.name.clone(),
            sql_type: raw.sql_type.clone(),
            value_type: ValueType::from_sql_type(&raw.sql_type),
            required: raw.not_null != 0 || primary_key,
            default: raw.dflt_value.as_deref().map(unquote_default),
            primary_key,
            foreign_key: foreign_keys.iter().any(|fk| fk == &raw.name),
            autoincrement,
        }
    }

    pub fn nullable(&self) -> bool {
        !self.required
    }

    pub fn is_key(&self) -> bool {
        self.primary_key || self.foreign_key
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

fn unquote_default(expr: &str) -> String {
    let expr = expr.trim();
    if expr.len() >= 2 && expr.starts_with('\'') && expr.ends_with('\'') {
        expr[1..expr.len() - 1].replace("''", "'")
    } else {
        expr.to_string()
    }
}
