//! Request handlers

pub mod admin;
pub mod auth;
pub mod claims;
pub mod health;

use core_kernel::ClaimId;

use crate::error::ApiError;

/// Accepts both `CLM-12` and `12`
pub(crate) fn parse_claim_id(raw: &str) -> Result<ClaimId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("'{}' is not a claim id", raw)))
}
