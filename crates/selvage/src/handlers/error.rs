//! api error handling for http handlers.
//!
//! every error leaves the router as `{"error": message}` with the matching
//! status code. internal errors are additionally logged; the message (never
//! a backtrace) is all the caller sees.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// api error type for handler responses.
#[derive(Debug)]
pub enum ApiError {
    /// malformed or unusable request (400)
    BadRequest(String),
    /// precondition violated, e.g. activating a non-inactive key (400)
    Conflict(String),
    /// missing credential (401)
    Unauthorized(String),
    /// credential present but invalid or expired (403)
    Forbidden(String),
    /// resource absent (404)
    NotFound(String),
    /// endpoint requires a protocol upgrade (426)
    UpgradeRequired(String),
    /// anything else (500)
    Internal(String),
}

/// uniform error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// create bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// create conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// create unauthorized error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// create forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// create not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// create upgrade required error
    pub fn upgrade_required(msg: impl Into<String>) -> Self {
        Self::UpgradeRequired(msg.into())
    }

    /// create internal server error from any error type
    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) | ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::UpgradeRequired(msg) => (StatusCode::UPGRADE_REQUIRED, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error surfaced to caller");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// extension trait for converting results to apierror.
pub trait ResultExt<T> {
    /// convert error to internal server error
    fn map_internal(self) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn map_internal(self) -> Result<T, ApiError> {
        self.map_err(ApiError::internal)
    }
}

/// extension trait for converting options to apierror.
pub trait OptionExt<T> {
    /// convert none to unauthorized error
    fn or_unauthorized(self, msg: &str) -> Result<T, ApiError>;
    /// convert none to forbidden error
    fn or_forbidden(self, msg: &str) -> Result<T, ApiError>;
    /// convert none to not found error
    fn or_not_found(self, msg: &str) -> Result<T, ApiError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_unauthorized(self, msg: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::unauthorized(msg))
    }

    fn or_forbidden(self, msg: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::forbidden(msg))
    }

    fn or_not_found(self, msg: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(msg))
    }
}
