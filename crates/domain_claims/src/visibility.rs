//! What each role is shown
//!
//! Administrators always see the stored status. Claimants see a projection
//! that hides a fresh review for the length of the grace window, so an
//! administrator can undo a mistaken review without the claimant ever seeing
//! it flicker, and the claimant can still withdraw a just-filed claim.
//! Nothing here is stored; every value is a function of the record and "now".

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Amount, ClaimId};
use crate::claim::{Claim, ClaimStatus};
use crate::policy::LifecyclePolicy;

/// Status a claimant is shown for a stored status
pub fn display_status(
    status: ClaimStatus,
    review_started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    policy: &LifecyclePolicy,
) -> ClaimStatus {
    match (status, review_started_at) {
        (ClaimStatus::Reviewing, Some(started)) if policy.within_grace(started, now) => {
            ClaimStatus::Submitted
        }
        _ => status,
    }
}

/// Overdue flag for the administrator list
pub fn is_overdue(claim: &Claim, now: DateTime<Utc>, policy: &LifecyclePolicy) -> bool {
    claim.status == ClaimStatus::Submitted && policy.is_past_overdue(claim.created_at, now)
}

/// Claimant may delete
pub fn can_delete(display: ClaimStatus, status: ClaimStatus) -> bool {
    display == ClaimStatus::Submitted || status == ClaimStatus::Returned
}

/// Claimant may confirm the funds arrived
pub fn can_mark_received(display: ClaimStatus) -> bool {
    display == ClaimStatus::Reviewing
}

/// Claimant-facing wording for a displayed status
pub fn status_label(display: ClaimStatus) -> &'static str {
    match display {
        ClaimStatus::Submitted => "Receipt under review",
        ClaimStatus::Reviewing => "Registered, awaiting disbursement",
        ClaimStatus::Returned => "Returned: physical receipt not received",
        ClaimStatus::Done => "Closed",
    }
}

/// A claim as its owner sees it
///
/// Deliberately omits the stored status and review timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimantView {
    pub id: ClaimId,
    pub amount: Amount,
    pub invoice_date: NaiveDate,
    pub reason: String,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub display_status: ClaimStatus,
    pub status_label: String,
    pub can_delete: bool,
    pub can_mark_received: bool,
}

impl ClaimantView {
    pub fn project(claim: &Claim, now: DateTime<Utc>, policy: &LifecyclePolicy) -> Self {
        let display = display_status(claim.status, claim.review_started_at, now, policy);
        Self {
            id: claim.id,
            amount: claim.amount,
            invoice_date: claim.invoice_date,
            reason: claim.reason.clone(),
            tax_id: claim.tax_id.clone(),
            created_at: claim.created_at,
            display_status: display,
            status_label: status_label(display).to_string(),
            can_delete: can_delete(display, claim.status),
            can_mark_received: can_mark_received(display),
        }
    }
}

/// A claim on the administrator's work list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClaim {
    pub claim: Claim,
    pub is_overdue: bool,
    /// When the undo window closes, while it is still open
    pub undo_deadline: Option<DateTime<Utc>>,
}

impl PendingClaim {
    pub fn annotate(claim: Claim, now: DateTime<Utc>, policy: &LifecyclePolicy) -> Self {
        let is_overdue = is_overdue(&claim, now, policy);
        let undo_deadline = match (claim.status, claim.review_started_at) {
            (ClaimStatus::Reviewing, Some(started)) if policy.within_grace(started, now) => {
                Some(policy.grace_deadline(started))
            }
            _ => None,
        };
        Self {
            claim,
            is_overdue,
            undo_deadline,
        }
    }
}
