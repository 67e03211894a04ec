//! Standard JSON envelope: `{ message, success, data? }`.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub message: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

pub fn success(status: StatusCode, message: impl Into<String>, data: Value) -> (StatusCode, Json<ApiResponse>) {
    (
        status,
        Json(ApiResponse {
            message: message.into(),
            success: true,
            data: Some(data),
        }),
    )
}

/// Human summary of a result: "entry created", "3 entries deleted".
pub fn summary(verb: &str, data: &Value) -> String {
    match data {
        Value::Array(rows) if rows.len() == 1 => format!("1 entry {}", verb),
        Value::Array(rows) => format!("{} entries {}", rows.len(), verb),
        _ => format!("entry {}", verb),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summaries() {
        assert_eq!(summary("created", &json!({"id": 1})), "entry created");
        assert_eq!(summary("read", &json!([])), "0 entries read");
        assert_eq!(summary("deleted", &json!([{"id": 1}])), "1 entry deleted");
    }
}
