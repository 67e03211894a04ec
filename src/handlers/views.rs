//! HTML views: index, listing and one form view per model operation.

use crate::error::AppError;
use crate::form::{BoundForm, FormSchema};
use crate::model::{ColumnSet, Operation};
use crate::render::{self, html, Alert, Category, OperationView};
use crate::service::{CrudExecutor, LISTING_LIMIT};
use crate::state::{AppState, ModelState, OperationState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    Form,
};
use serde_json::{Map, Value};

pub async fn index(State(state): State<AppState>) -> Response {
    html(StatusCode::OK, render::index_page(&state))
}

pub async fn listing(State(ms): State<ModelState>) -> Result<Response, AppError> {
    let columns = ms.model.columns(&ms.app.pool).await?;
    let rows = CrudExecutor::new(&ms.app.pool, ms.model.name(), &columns)
        .read(&Map::new(), Some(LISTING_LIMIT))
        .await?;
    Ok(html(
        StatusCode::OK,
        render::listing_page(&ms.app, &ms.model, &columns, &rows),
    ))
}

fn page(
    os: &OperationState,
    columns: &ColumnSet,
    form: &BoundForm,
    rows: Option<&[Value]>,
    alerts: Vec<Alert>,
) -> Response {
    let view = OperationView {
        model: &os.model,
        operation: os.operation,
        columns,
        form,
        rows,
        alerts,
    };
    html(StatusCode::OK, render::operation_page(&os.app, view))
}

/// GET: prefill from the query string. Read also runs the filter.
pub async fn op_view_get(
    State(os): State<OperationState>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let columns = os.model.columns(&os.app.pool).await?;
    let schema = FormSchema::synthesize(&os.model, os.operation, &columns);
    if os.operation != Operation::Read {
        let form = schema.prefill(&query);
        return Ok(page(&os, &columns, &form, None, Vec::new()));
    }

    let form = schema.bind(&query);
    let Ok(params) = form.params() else {
        return Ok(page(&os, &columns, &form, None, Vec::new()));
    };
    let executor = CrudExecutor::new(&os.app.pool, os.model.name(), &columns);
    match executor.operate(params).await {
        Ok(Value::Array(rows)) => Ok(page(&os, &columns, &form, Some(&rows), Vec::new())),
        Ok(_) => Ok(page(&os, &columns, &form, None, Vec::new())),
        Err(failure) => {
            let alert = Alert::new(Category::Danger, failure.to_string());
            Ok(page(&os, &columns, &form, None, vec![alert]))
        }
    }
}

/// POST: bind the submitted form, execute, and re-render with an alert.
pub async fn op_view_post(
    State(os): State<OperationState>,
    Form(data): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let columns = os.model.columns(&os.app.pool).await?;
    let schema = FormSchema::synthesize(&os.model, os.operation, &columns);
    let form = schema.bind(&data);
    let params = match form.params() {
        Ok(p) => p,
        Err(errors) => {
            tracing::info!(model = %os.model.name(), operation = %os.operation, errors = ?errors, "form rejected");
            return Ok(page(&os, &columns, &form, None, Vec::new()));
        }
    };

    let executor = CrudExecutor::new(&os.app.pool, os.model.name(), &columns);
    match executor.operate(params).await {
        Ok(data) => {
            let rows = match data {
                Value::Array(rows) => rows,
                row => vec![row],
            };
            let alert = Alert::new(
                Category::Success,
                format!("entry {}", os.operation.past_tense()),
            );
            Ok(page(&os, &columns, &form, Some(&rows), vec![alert]))
        }
        Err(failure) => {
            let alert = Alert::new(Category::Danger, failure.to_string());
            Ok(page(&os, &columns, &form, None, vec![alert]))
        }
    }
}
