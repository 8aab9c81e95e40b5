//! Test Data Builders
//!
//! Builders let tests state only the fields they care about and take
//! sensible defaults for everything else.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use core_kernel::{ClaimId, ManualClock, OwnerId};
use domain_claims::{
    Attestations, Claim, ClaimError, ClaimSubmission, InMemoryClaimStore, LifecycleEngine,
    LifecyclePolicy,
};
use fake::faker::lorem::en::Words;
use fake::Fake;
use rust_decimal::Decimal;

use crate::fixtures::{OwnerFixtures, SubmissionFixtures, TemporalFixtures};

/// Builder for claim submissions
pub struct ClaimSubmissionBuilder {
    amount: Decimal,
    invoice_date: Option<NaiveDate>,
    reason: String,
    tax_id: Option<String>,
}

impl Default for ClaimSubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimSubmissionBuilder {
    /// Starts from the canonical supplies submission
    pub fn new() -> Self {
        let base = SubmissionFixtures::supplies();
        Self {
            amount: base.amount,
            invoice_date: base.invoice_date,
            reason: base.reason,
            tax_id: base.tax_id,
        }
    }

    /// Replaces the reason with a few random words
    pub fn with_random_reason(mut self) -> Self {
        let words: Vec<String> = Words(2..5).fake();
        self.reason = words.join(" ");
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_invoice_date(mut self, date: Option<NaiveDate>) -> Self {
        self.invoice_date = date;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    pub fn build(self) -> ClaimSubmission {
        ClaimSubmission {
            amount: self.amount,
            invoice_date: self.invoice_date,
            reason: self.reason,
            tax_id: self.tax_id,
        }
    }
}

/// An engine over an empty in-memory store, driven by a manual clock
pub struct EngineHarness {
    pub engine: LifecycleEngine,
    pub clock: ManualClock,
    pub store: Arc<InMemoryClaimStore>,
}

impl Default for EngineHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineHarness {
    /// Default policy, clock frozen at the fixture epoch
    pub fn new() -> Self {
        Self::with_policy(LifecyclePolicy::default())
    }

    pub fn with_policy(policy: LifecyclePolicy) -> Self {
        let clock = ManualClock::at(TemporalFixtures::epoch());
        let store = Arc::new(InMemoryClaimStore::new());
        let engine = LifecycleEngine::new(store.clone(), Arc::new(clock.clone()), policy);
        Self {
            engine,
            clock,
            store,
        }
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.clock.advance(Duration::minutes(minutes));
    }

    pub fn advance_days(&self, days: i64) {
        self.clock.advance(Duration::days(days));
    }

    /// Files the canonical submission for the default claimant
    pub async fn file_default(&self) -> Result<Claim, ClaimError> {
        self.file_for(&OwnerFixtures::claimant()).await
    }

    pub async fn file_for(&self, owner: &OwnerId) -> Result<Claim, ClaimError> {
        self.engine
            .file_claim(owner, SubmissionFixtures::supplies(), Attestations::confirmed())
            .await
    }

    /// Files a claim and starts its review right away
    pub async fn file_and_review(&self) -> Result<Claim, ClaimError> {
        let claim = self.file_default().await?;
        self.engine.begin_review(claim.id).await
    }

    /// Stored record, bypassing the claimant projection
    pub async fn stored(&self, id: ClaimId) -> Option<Claim> {
        use domain_claims::ClaimStore;
        self.store.get(id).await.ok()
    }
}
