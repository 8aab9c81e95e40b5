//! Admission checks for new claims
//!
//! A claim is admitted only if every immutable field is within bounds and the
//! claimant ticked every item of the receipt checklist. The checklist is a
//! one-time gate: it is consumed here and never stored.
//!
//! # Rules
//!
//! - amount is strictly positive, at most the policy ceiling, whole cents
//! - reason is not blank
//! - invoice date is present
//! - tax id is absent (blank or a "none" marker) or exactly 8 digits
//! - all three attestations are true

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Amount, MoneyError, OwnerId};
use crate::claim::NewClaim;
use crate::error::ClaimError;
use crate::policy::LifecyclePolicy;

/// Markers a claimant may type instead of a tax id
const NO_TAX_ID_MARKERS: &[&str] = &["none", "n/a", "na", "-", "無"];

/// Length of a business tax id
const TAX_ID_LEN: usize = 8;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Raw claim fields as entered by the claimant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSubmission {
    pub amount: Decimal,
    pub invoice_date: Option<NaiveDate>,
    pub reason: String,
    #[serde(default)]
    pub tax_id: Option<String>,
}

/// The receipt checklist shown next to the filing form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestations {
    /// The receipt carries the claimant's signature or stamp
    pub receipt_signed: bool,
    /// The spending reason is written on the receipt
    pub reason_noted: bool,
    /// The tax id on the receipt was checked
    pub tax_id_checked: bool,
}

impl Attestations {
    /// All items ticked
    pub fn confirmed() -> Self {
        Self {
            receipt_signed: true,
            reason_noted: true,
            tax_id_checked: true,
        }
    }

    pub fn all_confirmed(&self) -> bool {
        self.receipt_signed && self.reason_noted && self.tax_id_checked
    }

    fn missing(&self) -> Vec<FieldViolation> {
        [
            ("attestations.receipt_signed", self.receipt_signed),
            ("attestations.reason_noted", self.reason_noted),
            ("attestations.tax_id_checked", self.tax_id_checked),
        ]
        .into_iter()
        .filter(|(_, ticked)| !ticked)
        .map(|(field, _)| FieldViolation::new(field, "must be confirmed"))
        .collect()
    }
}

/// Normalises a claimant-entered tax id
///
/// Blank input and the usual "none" markers mean there is no tax id.
pub fn normalize_tax_id(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    if NO_TAX_ID_MARKERS.contains(&lowered.as_str()) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Returns true if the value is a well-formed business tax id
pub fn is_valid_tax_id(value: &str) -> bool {
    value.len() == TAX_ID_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

/// Admits a submission, or reports every violated field at once
pub fn admit(
    owner: &OwnerId,
    submission: ClaimSubmission,
    attestations: Attestations,
    policy: &LifecyclePolicy,
    now: DateTime<Utc>,
) -> Result<NewClaim, ClaimError> {
    let mut violations = Vec::new();

    let amount = match Amount::bounded(submission.amount, policy.amount_ceiling) {
        Ok(amount) => Some(amount),
        Err(err) => {
            violations.push(amount_violation(&err));
            None
        }
    };

    let reason = submission.reason.trim().to_string();
    if reason.is_empty() {
        violations.push(FieldViolation::new("reason", "must not be empty"));
    }

    if submission.invoice_date.is_none() {
        violations.push(FieldViolation::new("invoice_date", "is required"));
    }

    let tax_id = normalize_tax_id(submission.tax_id.as_deref());
    if let Some(value) = &tax_id {
        if !is_valid_tax_id(value) {
            violations.push(FieldViolation::new("tax_id", "must be exactly 8 digits"));
        }
    }

    violations.extend(attestations.missing());

    match (amount, submission.invoice_date) {
        (Some(amount), Some(invoice_date)) if violations.is_empty() => Ok(NewClaim {
            owner_id: owner.clone(),
            amount,
            invoice_date,
            reason,
            tax_id,
            created_at: now,
        }),
        _ => Err(ClaimError::Validation(violations)),
    }
}

fn amount_violation(err: &MoneyError) -> FieldViolation {
    let message = match err {
        MoneyError::NotPositive(_) => "must be greater than zero".to_string(),
        MoneyError::ExceedsCeiling { ceiling, .. } => format!("must not exceed {}", ceiling),
        MoneyError::TooPrecise(_) => "must not have more than two decimal places".to_string(),
    };
    FieldViolation::new("amount", message)
}
