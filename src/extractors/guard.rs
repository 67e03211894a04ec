//! Per-model request guards, run as middleware ahead of a model's routes.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Inspects request parts and may reject before the handler runs.
#[async_trait]
pub trait RequestGuard: Send + Sync {
    async fn check(&self, parts: &Parts) -> Result<(), AppError>;
}

/// Requires a header to carry an exact value (e.g. a shared admin token).
#[derive(Clone, Debug)]
pub struct HeaderGuard {
    header: String,
    expected: String,
}

impl HeaderGuard {
    pub fn new(header: impl Into<String>, expected: impl Into<String>) -> Self {
        HeaderGuard {
            header: header.into(),
            expected: expected.into(),
        }
    }
}

#[async_trait]
impl RequestGuard for HeaderGuard {
    async fn check(&self, parts: &Parts) -> Result<(), AppError> {
        let value = parts
            .headers
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim);
        match value {
            Some(v) if v == self.expected => Ok(()),
            Some(_) => Err(AppError::Forbidden(format!("invalid {}", self.header))),
            None => Err(AppError::Forbidden(format!("missing {}", self.header))),
        }
    }
}

pub type Guards = Arc<[Arc<dyn RequestGuard>]>;

/// Middleware: run every guard in registration order; the first rejection wins.
pub async fn run_guards(State(guards): State<Guards>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    for guard in guards.iter() {
        if let Err(e) = guard.check(&parts).await {
            tracing::info!(uri = %parts.uri, error = %e, "request rejected by guard");
            return e.into_response();
        }
    }
    next.run(Request::from_parts(parts, body)).await
}
