//! Transactional CRUD execution against SQLite.

use crate::error::CrudFailure;
use crate::form::OperationParams;
use crate::model::{ColumnDescriptor, ColumnSet, Operation, ValueType};
use crate::sql::{self, QueryBuf, SqliteBindValue};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{SqliteConnection, SqlitePool};

/// Row cap for listing views.
pub const LISTING_LIMIT: u32 = 100;

/// Runs one statement per call inside its own transaction. Holds no state between calls.
pub struct CrudExecutor<'a> {
    pool: &'a SqlitePool,
    model: &'a str,
    columns: &'a ColumnSet,
}

impl<'a> CrudExecutor<'a> {
    pub fn new(pool: &'a SqlitePool, model: &'a str, columns: &'a ColumnSet) -> Self {
        CrudExecutor { pool, model, columns }
    }

    /// Dispatch validated form params to the matching operation.
    pub async fn operate(&self, params: OperationParams) -> Result<Value, CrudFailure> {
        match params {
            OperationParams::Create { insert } => self.create(&insert).await,
            OperationParams::Read { filter } => self.read(&filter, None).await.map(Value::Array),
            OperationParams::Update { filter, insert } => {
                self.update(&filter, &insert).await.map(Value::Array)
            }
            OperationParams::Delete { filter } => self.delete(&filter).await.map(Value::Array),
        }
    }

    /// Insert one row. Returns the stored row.
    pub async fn create(&self, insert: &Map<String, Value>) -> Result<Value, CrudFailure> {
        tracing::info!(model = %self.model, params = ?insert, "creating entry");
        let q = sql::insert(self.model, &self.columns.visible, insert);
        let rows = self.run(Operation::Create, &q).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CrudFailure::new(self.model, Operation::Create, "no row returned"))
    }

    /// Rows matching every filter (all rows for an empty filter).
    pub async fn read(
        &self,
        filter: &Map<String, Value>,
        limit: Option<u32>,
    ) -> Result<Vec<Value>, CrudFailure> {
        tracing::info!(model = %self.model, params = ?filter, "reading entries");
        let order_by = self.columns.primary_key().map(|c| c.name.as_str());
        let q = sql::select(self.model, &self.columns.visible, filter, order_by, limit);
        self.run(Operation::Read, &q).await
    }

    /// Set `insert` on every row matching `filter`. Returns the updated rows.
    pub async fn update(
        &self,
        filter: &Map<String, Value>,
        insert: &Map<String, Value>,
    ) -> Result<Vec<Value>, CrudFailure> {
        tracing::info!(model = %self.model, filter = ?filter, insert = ?insert, "updating entries");
        let q = sql::update(self.model, &self.columns.visible, filter, insert);
        self.run(Operation::Update, &q).await
    }

    /// Delete every row matching `filter`. Returns the deleted rows.
    pub async fn delete(&self, filter: &Map<String, Value>) -> Result<Vec<Value>, CrudFailure> {
        tracing::info!(model = %self.model, params = ?filter, "deleting entries");
        let q = sql::delete(self.model, &self.columns.visible, filter);
        self.run(Operation::Delete, &q).await
    }

    async fn run(&self, operation: Operation, q: &QueryBuf) -> Result<Vec<Value>, CrudFailure> {
        let fail = |e: sqlx::Error| CrudFailure::new(self.model, operation, e);
        let mut tx = self.pool.begin().await.map_err(fail)?;
        match Self::query_many(&mut tx, q, &self.columns.visible).await {
            Ok(rows) => {
                tx.commit().await.map_err(fail)?;
                Ok(rows)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                tracing::warn!(model = %self.model, operation = %operation, error = %e, "rolled back");
                Err(fail(e))
            }
        }
    }

    async fn query_many(
        conn: &mut SqliteConnection,
        q: &QueryBuf,
        columns: &[ColumnDescriptor],
    ) -> Result<Vec<Value>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(SqliteBindValue::from(p));
        }
        let rows = query.fetch_all(&mut *conn).await?;
        Ok(rows.iter().map(|r| row_to_json(r, columns)).collect())
    }
}

fn row_to_json(row: &SqliteRow, columns: &[ColumnDescriptor]) -> Value {
    let mut map = Map::new();
    for (idx, col) in columns.iter().enumerate() {
        map.insert(col.name.clone(), cell_to_value(row, idx, col.value_type));
    }
    Value::Object(map)
}

/// Decode by the cell's storage class, then shape by the column's declared type.
fn cell_to_value(row: &SqliteRow, idx: usize, value_type: ValueType) -> Value {
    use sqlx::{Row, TypeInfo, ValueRef};
    let Ok(raw) = row.try_get_raw(idx) else {
        return Value::Null;
    };
    if raw.is_null() {
        return Value::Null;
    }
    let storage = raw.type_info().name().to_string();
    match storage.as_str() {
        "INTEGER" | "BIGINT" | "BOOLEAN" => match row.try_get_unchecked::<i64, _>(idx) {
            Ok(n) if value_type == ValueType::Bool => Value::Bool(n != 0),
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::Null,
        },
        "REAL" => row
            .try_get_unchecked::<f64, _>(idx)
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "BLOB" => row
            .try_get_unchecked::<Vec<u8>, _>(idx)
            .map(|b| Value::String(String::from_utf8_lossy(&b).into_owned()))
            .unwrap_or(Value::Null),
        _ => row
            .try_get_unchecked::<String, _>(idx)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Cell as display text; `NULL` for null.
pub fn display_value(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}
