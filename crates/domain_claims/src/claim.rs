//! Claim aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Amount, ClaimId, OwnerId};
use crate::admission::{self, FieldViolation};

/// Claim status
///
/// ```text
/// Submitted ──begin review──▶ Reviewing ──funds received──▶ Done
///     │   ◀──undo (grace)───────┘
///     └──receipt missing──▶ Returned
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Filed by the claimant, waiting for the physical receipt
    Submitted,
    /// Registered in the internal system by an administrator
    Reviewing,
    /// Physical receipt never arrived; only exit is deletion
    Returned,
    /// Claimant confirmed the funds were received
    Done,
}

impl ClaimStatus {
    /// Returns the storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::Reviewing => "reviewing",
            ClaimStatus::Returned => "returned",
            ClaimStatus::Done => "done",
        }
    }

    /// Checks if transition is valid
    ///
    /// The engine refuses any patch whose target is not listed here. The only
    /// backwards edge is the administrator undo; whether it is still allowed
    /// depends on the grace window and is decided by the engine.
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self, target),
            (Submitted, Reviewing) |
            (Submitted, Returned) |
            (Reviewing, Submitted) |
            (Reviewing, Done)
        )
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClaimStatus::Submitted => "Submitted",
            ClaimStatus::Reviewing => "Reviewing",
            ClaimStatus::Returned => "Returned",
            ClaimStatus::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Error returned when a stored status string is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown claim status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ClaimStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "submitted" => Ok(ClaimStatus::Submitted),
            "reviewing" => Ok(ClaimStatus::Reviewing),
            "returned" => Ok(ClaimStatus::Returned),
            "done" => Ok(ClaimStatus::Done),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A reimbursement claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier, assigned by the store
    pub id: ClaimId,
    /// Staff member who filed the claim
    pub owner_id: OwnerId,
    /// Amount to reimburse
    pub amount: Amount,
    /// Date printed on the receipt
    pub invoice_date: NaiveDate,
    /// Why the money was spent
    pub reason: String,
    /// Business tax id on the receipt, if any
    pub tax_id: Option<String>,
    /// True administrative status
    pub status: ClaimStatus,
    /// Filing timestamp
    pub created_at: DateTime<Utc>,
    /// Set while reviewing, kept once done, cleared by undo
    pub review_started_at: Option<DateTime<Utc>>,
}

impl Claim {
    /// Materialises a stored record from an admitted claim and its new id
    pub fn from_new(id: ClaimId, new: NewClaim) -> Self {
        Self {
            id,
            owner_id: new.owner_id,
            amount: new.amount,
            invoice_date: new.invoice_date,
            reason: new.reason,
            tax_id: new.tax_id,
            status: ClaimStatus::Submitted,
            created_at: new.created_at,
            review_started_at: None,
        }
    }

    /// Returns true if the claim belongs to the given owner
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner_id == owner
    }

    /// Checks the review timestamp invariant
    ///
    /// `review_started_at` is present exactly while reviewing, and may remain
    /// once the claim is done.
    pub fn review_timestamp_consistent(&self) -> bool {
        match self.status {
            ClaimStatus::Reviewing => self.review_started_at.is_some(),
            ClaimStatus::Submitted | ClaimStatus::Returned => self.review_started_at.is_none(),
            ClaimStatus::Done => true,
        }
    }
}

/// An admitted claim that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClaim {
    pub owner_id: OwnerId,
    pub amount: Amount,
    pub invoice_date: NaiveDate,
    pub reason: String,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewClaim {
    /// Re-checks the immutable-field constraints
    ///
    /// Stores call this before persisting so that no adapter can write a record
    /// that bypassed admission.
    pub fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        if self.amount.value() <= rust_decimal::Decimal::ZERO {
            violations.push(FieldViolation::new("amount", "must be greater than zero"));
        }
        if self.reason.trim().is_empty() {
            violations.push(FieldViolation::new("reason", "must not be empty"));
        }
        if let Some(tax_id) = &self.tax_id {
            if !admission::is_valid_tax_id(tax_id) {
                violations.push(FieldViolation::new("tax_id", "must be exactly 8 digits"));
            }
        }
        violations
    }
}

/// Field-level change applied by a transition
///
/// `review_started_at` uses a nested option: `None` leaves the field alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimPatch {
    pub status: Option<ClaimStatus>,
    pub review_started_at: Option<Option<DateTime<Utc>>>,
}

impl ClaimPatch {
    /// Submitted -> Reviewing
    pub fn begin_review(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(ClaimStatus::Reviewing),
            review_started_at: Some(Some(at)),
        }
    }

    /// Reviewing -> Submitted
    pub fn undo_review() -> Self {
        Self {
            status: Some(ClaimStatus::Submitted),
            review_started_at: Some(None),
        }
    }

    /// Submitted -> Returned
    pub fn returned() -> Self {
        Self {
            status: Some(ClaimStatus::Returned),
            review_started_at: None,
        }
    }

    /// Reviewing -> Done
    pub fn done() -> Self {
        Self {
            status: Some(ClaimStatus::Done),
            review_started_at: None,
        }
    }

    /// Applies the patch to a record in place
    pub fn apply(&self, claim: &mut Claim) {
        if let Some(status) = self.status {
            claim.status = status;
        }
        if let Some(review_started_at) = self.review_started_at {
            claim.review_started_at = review_started_at;
        }
    }
}
