// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// Each variant maps to an HTTP status code and error response.
/// `LoginRequired` is special-cased: browser flows get a redirect to the
/// login page (the flash message is queued by the session extractor).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("You must be logged in to do that")]
    LoginRequired,

    #[error("{0}")]
    Forbidden(String),

    #[error("Upload error: {0}")]
    UploadError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Mail error: {0}")]
    MailError(String),

    #[error("Session error: {0}")]
    SessionError(String),
}

/// Convert StoreError to HTTP response
impl ResponseError for StoreError {
    fn error_response(&self) -> HttpResponse {
        if let StoreError::LoginRequired = self {
            return HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/login"))
                .finish();
        }

        let (status, error_code) = match self {
            StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            StoreError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            StoreError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            StoreError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            StoreError::LoginRequired => (StatusCode::SEE_OTHER, "LOGIN_REQUIRED"),
            StoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            StoreError::UploadError(_) => (StatusCode::BAD_REQUEST, "UPLOAD_ERROR"),
            StoreError::TemplateError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_ERROR"),
            StoreError::MailError(_) => (StatusCode::BAD_GATEWAY, "MAIL_ERROR"),
            StoreError::SessionError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR"),
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            StoreError::ValidationError(_) => StatusCode::BAD_REQUEST,
            StoreError::LoginRequired => StatusCode::SEE_OTHER,
            StoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            StoreError::UploadError(_) => StatusCode::BAD_REQUEST,
            StoreError::TemplateError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StoreError::MailError(_) => StatusCode::BAD_GATEWAY,
            StoreError::SessionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
