//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for a described table.

use crate::model::ColumnDescriptor;
use serde_json::{Map, Value};

/// Quote identifier for SQLite (safe: only from catalog metadata).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }
}

fn column_list(columns: &[ColumnDescriptor]) -> String {
    columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_column(columns: &[ColumnDescriptor], name: &str) -> bool {
    columns.iter().any(|c| c.name == name)
}

/// WHERE clause from equality filters on known columns; null compiles to IS NULL.
fn where_clause(q: &mut QueryBuf, columns: &[ColumnDescriptor], filters: &Map<String, Value>) -> String {
    let mut parts = Vec::new();
    for (col, val) in filters {
        if !is_column(columns, col) {
            continue;
        }
        if val.is_null() {
            parts.push(format!("{} IS NULL", quoted(col)));
        } else {
            q.params.push(val.clone());
            parts.push(format!("{} = ?", quoted(col)));
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// SELECT with exact-match filters, optional ORDER BY column and LIMIT.
pub fn select(
    table: &str,
    columns: &[ColumnDescriptor],
    filters: &Map<String, Value>,
    order_by: Option<&str>,
    limit: Option<u32>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, columns, filters);
    let order_sql = order_by
        .map(|c| format!(" ORDER BY {}", quoted(c)))
        .unwrap_or_default();
    let limit_sql = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}",
        column_list(columns),
        quoted(table),
        where_sql,
        order_sql,
        limit_sql
    );
    q
}

/// INSERT only the provided known columns so the database fills defaults for the rest.
pub fn insert(table: &str, columns: &[ColumnDescriptor], values: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    for (name, val) in values {
        if !is_column(columns, name) {
            continue;
        }
        cols.push(quoted(name));
        q.params.push(val.clone());
    }
    let returning = column_list(columns);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", quoted(table), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quoted(table),
            cols.join(", "),
            vec!["?"; cols.len()].join(", "),
            returning
        )
    };
    q
}

/// UPDATE rows matching `filters`, SET only provided known columns.
/// With nothing to set, degrades to a SELECT of the matching rows.
pub fn update(
    table: &str,
    columns: &[ColumnDescriptor],
    filters: &Map<String, Value>,
    values: &Map<String, Value>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (name, val) in values {
        if !is_column(columns, name) {
            continue;
        }
        sets.push(format!("{} = ?", quoted(name)));
        q.params.push(val.clone());
    }
    if sets.is_empty() {
        return select(table, columns, filters, None, None);
    }
    let where_sql = where_clause(&mut q, columns, filters);
    q.sql = format!(
        "UPDATE {} SET {}{} RETURNING {}",
        quoted(table),
        sets.join(", "),
        where_sql,
        column_list(columns)
    );
    q
}

/// DELETE rows matching `filters`, returning them.
pub fn delete(table: &str, columns: &[ColumnDescriptor], filters: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, columns, filters);
    q.sql = format!(
        "DELETE FROM {}{} RETURNING {}",
        quoted(table),
        where_sql,
        column_list(columns)
    );
    q
}
