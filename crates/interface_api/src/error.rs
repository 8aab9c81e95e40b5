//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_claims::{ClaimError, FieldViolation};

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The undo window has closed
    #[error("Transition expired at {deadline}")]
    TransitionExpired {
        message: String,
        deadline: DateTime<Utc>,
    },

    #[error("Validation error: {}", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::TransitionExpired { .. } => (StatusCode::CONFLICT, "transition_expired"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = match self {
            ApiError::Validation(details) => ErrorResponse {
                error: error_type.to_string(),
                message: "Some fields need attention".to_string(),
                details: Some(details),
                deadline: None,
            },
            ApiError::TransitionExpired { message, deadline } => ErrorResponse {
                error: error_type.to_string(),
                message,
                details: None,
                deadline: Some(deadline),
            },
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unavailable(msg)
            | ApiError::Internal(msg) => ErrorResponse {
                error: error_type.to_string(),
                message: msg,
                details: None,
                deadline: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Validation(violations) => ApiError::Validation(violations),
            ClaimError::NotFound(id) => {
                ApiError::NotFound(format!("Claim {} no longer exists", id))
            }
            ClaimError::Conflict(msg) => ApiError::Conflict(msg),
            ClaimError::TransitionExpired { claim_id, deadline } => ApiError::TransitionExpired {
                message: format!("The undo window for {} has closed", claim_id),
                deadline,
            },
            ClaimError::Unavailable(msg) => {
                error!(error = %msg, "Claim store unreachable");
                ApiError::Unavailable("Claim store unavailable, try again shortly".to_string())
            }
            ClaimError::Store(msg) => {
                error!(error = %msg, "Claim store failure");
                ApiError::Internal("Claim store unavailable".to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Issue(msg) => ApiError::Internal(msg),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldViolation::new(field.to_string(), message)
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation(details)
    }
}
