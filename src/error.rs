//! Typed errors and HTTP mapping.

use crate::form::FormErrors;
use crate::model::Operation;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("model registered twice: {0}")]
    DuplicateModel(String),
    #[error("invalid operation '{0}' (expected create, read, update or delete)")]
    InvalidOperation(String),
    #[error("invalid url prefix '{0}': must be empty or start with '/' and not end with '/'")]
    InvalidPrefix(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// The single failure kind raised by the CRUD executor. Always preceded by a rollback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} on '{model}' failed: {message}")]
pub struct CrudFailure {
    pub model: String,
    pub operation: Operation,
    pub message: String,
}

impl CrudFailure {
    pub fn new(model: impl Into<String>, operation: Operation, message: impl ToString) -> Self {
        CrudFailure {
            model: model.into(),
            operation,
            message: message.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed")]
    Validation(FormErrors),
    #[error(transparent)]
    Crud(#[from] CrudFailure),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FormErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Crud(_) => StatusCode::BAD_REQUEST,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let body = match self {
            AppError::Validation(errors) => ErrorBody {
                message,
                success: false,
                errors: Some(errors),
                operation: None,
                model: None,
            },
            AppError::Crud(failure) => ErrorBody {
                message,
                success: false,
                errors: None,
                operation: Some(failure.operation),
                model: Some(failure.model),
            },
            _ => ErrorBody {
                message,
                success: false,
                errors: None,
                operation: None,
                model: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
