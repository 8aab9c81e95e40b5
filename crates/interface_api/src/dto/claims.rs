//! Claims DTOs
//!
//! Amounts travel as decimal strings, never floats.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Amount, ClaimId};
use domain_claims::{Attestations, Claim, ClaimStatus, ClaimSubmission, PendingClaim};

/// Filing form
///
/// Only shape limits are checked here; the lifecycle rules run in the engine.
#[derive(Debug, Deserialize, Validate)]
pub struct FileClaimRequest {
    pub amount: Decimal,
    pub invoice_date: Option<NaiveDate>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub reason: String,
    #[validate(length(max = 32, message = "must be at most 32 characters"))]
    pub tax_id: Option<String>,
    /// Receipt checklist; every item must be ticked
    #[serde(default)]
    pub attestations: Attestations,
}

impl FileClaimRequest {
    pub fn into_parts(self) -> (ClaimSubmission, Attestations) {
        (
            ClaimSubmission {
                amount: self.amount,
                invoice_date: self.invoice_date,
                reason: self.reason,
                tax_id: self.tax_id,
            },
            self.attestations,
        )
    }
}

/// A claim with its stored status, for the owner right after an action or
/// for administrators
#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub id: ClaimId,
    pub reference: String,
    pub owner: String,
    pub amount: Amount,
    pub invoice_date: NaiveDate,
    pub reason: String,
    pub tax_id: Option<String>,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
    pub review_started_at: Option<DateTime<Utc>>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            id: claim.id,
            reference: claim.id.to_string(),
            owner: claim.owner_id.to_string(),
            amount: claim.amount,
            invoice_date: claim.invoice_date,
            reason: claim.reason,
            tax_id: claim.tax_id,
            status: claim.status,
            created_at: claim.created_at,
            review_started_at: claim.review_started_at,
        }
    }
}

/// Entry on the administrator's pending list
#[derive(Debug, Serialize, Deserialize)]
pub struct PendingClaimResponse {
    #[serde(flatten)]
    pub claim: ClaimResponse,
    pub is_overdue: bool,
    pub undo_deadline: Option<DateTime<Utc>>,
}

impl From<PendingClaim> for PendingClaimResponse {
    fn from(pending: PendingClaim) -> Self {
        Self {
            claim: pending.claim.into(),
            is_overdue: pending.is_overdue,
            undo_deadline: pending.undo_deadline,
        }
    }
}
