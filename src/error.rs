//! Error types for Gatehouse
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Callback request arrived without an authorization code (400)
    #[error("Authorization code not found")]
    MissingAuthorizationCode,

    /// Authorization code could not be exchanged for a token (500)
    #[error("Failed to exchange token: {0}")]
    TokenExchange(String),

    /// User profile could not be fetched or decoded (500)
    #[error("Failed to get user info: {0}")]
    ProfileFetch(String),

    /// Session could not be serialized or signed (500)
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code.
    /// The error text is written directly to the response body.
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AppError::MissingAuthorizationCode => (StatusCode::BAD_REQUEST, "missing_code"),
            AppError::TokenExchange(_) => (StatusCode::INTERNAL_SERVER_ERROR, "token_exchange"),
            AppError::ProfileFetch(_) => (StatusCode::INTERNAL_SERVER_ERROR, "profile_fetch"),
            AppError::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "session"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        (status, self.to_string()).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
