//! Claims domain errors

use chrono::{DateTime, Utc};
use thiserror::Error;

use core_kernel::{ClaimId, PortError};
use crate::admission::FieldViolation;

/// Errors that can occur in the claims domain
///
/// All of them are recoverable: callers surface them as messages and may
/// re-fetch and retry.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Claim not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Undo window for {claim_id} closed at {deadline}")]
    TransitionExpired {
        claim_id: ClaimId,
        deadline: DateTime<Utc>,
    },

    /// The store could not be reached; the same request may succeed later
    #[error("Claim store unavailable: {0}")]
    Unavailable(String),

    #[error("Claim store failure: {0}")]
    Store(String),
}

impl ClaimError {
    pub fn not_found(id: ClaimId) -> Self {
        ClaimError::NotFound(id.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClaimError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClaimError::Conflict(_))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, ClaimError::TransitionExpired { .. })
    }

    /// Field violations, empty for every other kind
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            ClaimError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

impl From<PortError> for ClaimError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => ClaimError::NotFound(id),
            PortError::Conflict { message } => ClaimError::Conflict(message),
            PortError::Validation { message, field } => ClaimError::Validation(vec![
                FieldViolation::new(field.unwrap_or_else(|| "claim".to_string()), message),
            ]),
            other if other.is_transient() => ClaimError::Unavailable(other.to_string()),
            other => ClaimError::Store(other.to_string()),
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
