//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::pricing::responses::PricingErrorResponse;
use crate::pricing::PricingError;

/// One failed field in a request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed ({} field errors)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(field_errors(&errors))
    }
}

/// Flatten validator output into `field.path` / message pairs, sorted by field
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_field_errors("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid ({})", err.code));
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

#[derive(Serialize)]
struct ValidationErrorBody<'a> {
    success: bool,
    errors: &'a [FieldError],
}

#[derive(Serialize)]
struct FailureBody<'a> {
    success: bool,
    error: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::NotFound(what) => {
                tracing::debug!("Not found: {}", what);
                (
                    StatusCode::NOT_FOUND,
                    Json(FailureBody {
                        success: false,
                        error: "Not found",
                    }),
                )
                    .into_response()
            }
            AppError::Validation(errors) => {
                tracing::debug!("Validation failed: {:?}", errors);
                (
                    StatusCode::BAD_REQUEST,
                    Json(ValidationErrorBody {
                        success: false,
                        errors,
                    }),
                )
                    .into_response()
            }
            AppError::Pricing(err) => {
                tracing::debug!("Pricing error: {}", err);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(PricingErrorResponse::from(err)),
                )
                    .into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(FailureBody {
                        success: false,
                        error: "Internal error",
                    }),
                )
                    .into_response()
            }
        }
    }
}

/// Response for a handler that panicked: logged, answered with a bare 500
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "handler panicked".to_string()
    };
    AppError::Internal(detail).into_response()
}

pub type Result<T> = std::result::Result<T, AppError>;
