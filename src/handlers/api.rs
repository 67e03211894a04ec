//! JSON API: one endpoint per model, the HTTP verb selects the operation.

use crate::error::AppError;
use crate::form::FormSchema;
use crate::model::Operation;
use crate::response::{success, summary, ApiResponse};
use crate::service::CrudExecutor;
use crate::state::ModelState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    Json,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parameters from a form-urlencoded body. An empty body carries none;
/// any other body must be a well-formed form.
fn body_params(headers: &HeaderMap, body: &[u8]) -> Result<Vec<(String, String)>, AppError> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let mime = content_type.split(';').next().unwrap_or("").trim();
    if !mime.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        return Err(AppError::UnsupportedMediaType(format!(
            "expected {}, got '{}'",
            FORM_CONTENT_TYPE, content_type
        )));
    }
    serde_urlencoded::from_bytes(body).map_err(|e| AppError::BadRequest(format!("form body: {}", e)))
}

pub async fn dispatch(
    State(ms): State<ModelState>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    let operation = Operation::from_method(&method)?;
    if !ms.model.allows(operation) {
        return Err(AppError::NotFound(format!(
            "operation '{}' on '{}'",
            operation,
            ms.model.name()
        )));
    }

    // Body first: the first value of a repeated key wins when binding.
    let mut params = body_params(&headers, &body)?;
    params.extend(query);

    let columns = ms.model.columns(&ms.app.pool).await?;
    let form = FormSchema::synthesize(&ms.model, operation, &columns).bind(&params);
    let params = form.params().map_err(AppError::Validation)?;

    let data = CrudExecutor::new(&ms.app.pool, ms.model.name(), &columns)
        .operate(params)
        .await?;
    let status = if operation == Operation::Create {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let message = summary(operation.past_tense(), &data);
    Ok(success(status, message, data))
}
