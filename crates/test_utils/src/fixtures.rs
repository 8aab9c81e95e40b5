//! Pre-built Test Fixtures
//!
//! Fixed, predictable values so that time-dependent assertions never depend
//! on when the suite runs.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::OwnerId;
use domain_claims::{Attestations, ClaimSubmission};
use rust_decimal_macros::dec;

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Instant every manual clock starts at (Mon 4 Mar 2024, 09:00 UTC)
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    /// Receipt date a few days before the epoch
    pub fn invoice_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }
}

/// Fixture for claimant and administrator identities
pub struct OwnerFixtures;

impl OwnerFixtures {
    pub fn claimant() -> OwnerId {
        OwnerId::new("wang.xiaoming")
    }

    pub fn other_claimant() -> OwnerId {
        OwnerId::new("li.xiaohua")
    }

    pub fn administrator() -> OwnerId {
        OwnerId::new("rileychien")
    }
}

/// Fixture for claim submissions
pub struct SubmissionFixtures;

impl SubmissionFixtures {
    /// The canonical "500 for supplies" submission
    pub fn supplies() -> ClaimSubmission {
        ClaimSubmission {
            amount: dec!(500),
            invoice_date: Some(TemporalFixtures::invoice_date()),
            reason: "supplies".to_string(),
            tax_id: None,
        }
    }

    /// Every checklist item ticked
    pub fn attested() -> Attestations {
        Attestations::confirmed()
    }
}
