//! Request-level error type shared by services and handlers.
//!
//! Every variant renders as the standard JSON envelope with a matching
//! HTTP status. Infrastructure failures are logged and masked.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use log::error;
use mongodb::error::{ErrorKind, WriteFailure};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::types::responses::api_response::{ApiResponse, ErrorDetails};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        message: String,
        errors: ValidationErrors,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>, errors: ValidationErrors) -> Self {
        AppError::Validation {
            message: message.into(),
            errors,
        }
    }
}

const DUPLICATE_KEY: i32 = 11000;

/// True when a write was rejected by a unique index.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (message, details) = match self {
            AppError::Validation { message, errors } => (message.clone(), Some(json!(errors))),
            AppError::Database(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                error!("Request failed: {:#}", self);
                ("Internal server error".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        HttpResponse::build(self.status_code())
            .json(ApiResponse::<()>::error(message, ErrorDetails { details }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use validator::ValidationError;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn detects_unique_index_violations() {
        let write_error: mongodb::error::WriteError =
            bson::from_document(bson::doc! { "code": 11000, "errmsg": "E11000 duplicate key" })
                .unwrap();
        let duplicate =
            mongodb::error::Error::from(ErrorKind::Write(WriteFailure::WriteError(write_error)));
        assert!(is_duplicate_key(&duplicate));

        let other: mongodb::error::WriteError =
            bson::from_document(bson::doc! { "code": 121, "errmsg": "validation failed" }).unwrap();
        let other = mongodb::error::Error::from(ErrorKind::Write(WriteFailure::WriteError(other)));
        assert!(!is_duplicate_key(&other));
        assert!(!is_duplicate_key(&mongodb::error::Error::custom("boom")));
    }

    #[actix_web::test]
    async fn internal_errors_are_masked() {
        let response =
            AppError::Internal(anyhow::anyhow!("secret connection string")).error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("Internal server error"));
        assert!(!text.contains("secret connection string"));
    }

    #[actix_web::test]
    async fn validation_errors_carry_field_details() {
        let mut errors = ValidationErrors::new();
        errors.add("name", ValidationError::new("length"));
        let response = AppError::validation("Invalid data", errors).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["message"], "Invalid data");
        assert!(value["error"]["details"].get("name").is_some());
    }
}
