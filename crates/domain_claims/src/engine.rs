//! Lifecycle engine
//!
//! The only authority for claim status transitions. Every transition follows
//! the same shape:
//!
//! 1. re-read the record from the store
//! 2. check the starting status (and, where relevant, the grace window)
//! 3. compare-and-update keyed on the status that was read
//!
//! If anyone else changed the claim between steps 1 and 3 the store reports
//! a conflict (or the claim is gone), and the caller refreshes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use core_kernel::{ClaimId, Clock, HealthCheckResult, OwnerId};

use crate::admission::{self, Attestations, ClaimSubmission};
use crate::claim::{Claim, ClaimPatch, ClaimStatus};
use crate::error::ClaimError;
use crate::policy::LifecyclePolicy;
use crate::ports::ClaimStore;
use crate::visibility::{self, ClaimantView, PendingClaim};

/// Applies lifecycle rules on top of a claim store
#[derive(Clone)]
pub struct LifecycleEngine {
    store: Arc<dyn ClaimStore>,
    clock: Arc<dyn Clock>,
    policy: LifecyclePolicy,
}

impl std::fmt::Debug for LifecycleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl LifecycleEngine {
    pub fn new(store: Arc<dyn ClaimStore>, clock: Arc<dyn Clock>, policy: LifecyclePolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Current instant according to the engine's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Health of the underlying store
    pub async fn store_health(&self) -> HealthCheckResult {
        self.store.health_check().await
    }

    // ========================================================================
    // Claimant operations
    // ========================================================================

    /// Files a new claim in `Submitted`
    #[instrument(skip(self, submission, attestations))]
    pub async fn file_claim(
        &self,
        owner: &OwnerId,
        submission: ClaimSubmission,
        attestations: Attestations,
    ) -> Result<Claim, ClaimError> {
        let now = self.now();
        let new_claim = admission::admit(owner, submission, attestations, &self.policy, now)
            .inspect_err(|err| warn!(error = %err, "Claim rejected at admission"))?;
        let claim = self.store.create(new_claim).await?;
        info!(claim_id = %claim.id, amount = %claim.amount, "Claim filed");
        Ok(claim)
    }

    /// The owner's claims, newest first, as the owner is allowed to see them
    #[instrument(skip(self))]
    pub async fn list_mine(&self, owner: &OwnerId) -> Result<Vec<ClaimantView>, ClaimError> {
        let now = self.now();
        let mut claims = self.store.list_by_owner(owner).await?;
        claims.sort_by(|a, b| b.id.cmp(&a.id));
        debug!(count = claims.len(), "Listed claimant claims");
        Ok(claims
            .iter()
            .map(|claim| ClaimantView::project(claim, now, &self.policy))
            .collect())
    }

    /// Claimant confirms the money arrived: Reviewing -> Done
    ///
    /// Only allowed once the claimant can see the review, i.e. after the
    /// grace window.
    #[instrument(skip(self))]
    pub async fn mark_received(&self, owner: &OwnerId, id: ClaimId) -> Result<Claim, ClaimError> {
        let now = self.now();
        let claim = self.owned_claim(owner, id).await?;
        let shown = visibility::display_status(
            claim.status,
            claim.review_started_at,
            now,
            &self.policy,
        );
        if !visibility::can_mark_received(shown) {
            warn!(claim_id = %id, shown = %shown, "Mark received rejected");
            return Err(ClaimError::Conflict(format!(
                "{} is shown as {}, funds can only be confirmed once it is Reviewing",
                id, shown
            )));
        }
        self.transition(&claim, ClaimPatch::done()).await
    }

    /// Claimant withdraws a claim
    ///
    /// Allowed while the claimant sees it as `Submitted` (which includes a
    /// review still inside its grace window) or while it is `Returned`. A
    /// hidden in-progress review is discarded.
    #[instrument(skip(self))]
    pub async fn delete_mine(&self, owner: &OwnerId, id: ClaimId) -> Result<(), ClaimError> {
        let now = self.now();
        let claim = self.owned_claim(owner, id).await?;
        let shown = visibility::display_status(
            claim.status,
            claim.review_started_at,
            now,
            &self.policy,
        );
        if !visibility::can_delete(shown, claim.status) {
            warn!(claim_id = %id, shown = %shown, "Delete rejected");
            return Err(ClaimError::Conflict(format!(
                "{} is shown as {} and can no longer be deleted",
                id, shown
            )));
        }

        self.store.delete(id, Some(claim.status)).await?;

        let discarded_review = claim.status == ClaimStatus::Reviewing;
        info!(claim_id = %id, discarded_review, "Claim deleted by owner");
        Ok(())
    }

    // ========================================================================
    // Administrator operations
    // ========================================================================

    /// Every claim not yet done, oldest first, with the overdue flag
    #[instrument(skip(self))]
    pub async fn list_pending(&self) -> Result<Vec<PendingClaim>, ClaimError> {
        let now = self.now();
        let mut claims: Vec<Claim> = self
            .store
            .list_all()
            .await?
            .into_iter()
            .filter(|c| c.status != ClaimStatus::Done)
            .collect();
        claims.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        debug!(count = claims.len(), "Listed pending claims");
        Ok(claims
            .into_iter()
            .map(|claim| PendingClaim::annotate(claim, now, &self.policy))
            .collect())
    }

    /// Administrator registered the claim internally: Submitted -> Reviewing
    #[instrument(skip(self))]
    pub async fn begin_review(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        require_status(&claim, ClaimStatus::Submitted)?;
        self.transition(&claim, ClaimPatch::begin_review(self.now())).await
    }

    /// Administrator takes back a review: Reviewing -> Submitted
    ///
    /// Only inside the grace window; afterwards the claimant may already have
    /// seen the review.
    #[instrument(skip(self))]
    pub async fn undo_review(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        require_status(&claim, ClaimStatus::Reviewing)?;
        let started = claim.review_started_at.ok_or_else(|| {
            ClaimError::Store(format!("{} is reviewing without a review timestamp", id))
        })?;
        if !self.policy.within_grace(started, self.now()) {
            let deadline = self.policy.grace_deadline(started);
            warn!(claim_id = %id, %deadline, "Undo requested after grace window");
            return Err(ClaimError::TransitionExpired {
                claim_id: id,
                deadline,
            });
        }
        self.transition(&claim, ClaimPatch::undo_review()).await
    }

    /// Physical receipt never arrived: Submitted -> Returned
    ///
    /// Never forced by elapsed time; the overdue flag only suggests it.
    #[instrument(skip(self))]
    pub async fn return_claim(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        require_status(&claim, ClaimStatus::Submitted)?;
        self.transition(&claim, ClaimPatch::returned()).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        self.store.get(id).await.map_err(|err| {
            if err.is_not_found() {
                warn!(claim_id = %id, "Claim no longer exists");
            }
            ClaimError::from(err)
        })
    }

    /// Loads a claim, hiding claims that belong to someone else
    async fn owned_claim(&self, owner: &OwnerId, id: ClaimId) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        if !claim.is_owned_by(owner) {
            warn!(claim_id = %id, "Claim requested by someone other than its owner");
            return Err(ClaimError::not_found(id));
        }
        Ok(claim)
    }

    async fn transition(&self, claim: &Claim, patch: ClaimPatch) -> Result<Claim, ClaimError> {
        let from = claim.status;
        if let Some(to) = patch.status {
            if !from.can_transition_to(to) {
                warn!(claim_id = %claim.id, %from, %to, "Transition not in lifecycle");
                return Err(ClaimError::Conflict(format!(
                    "{} cannot move from {} to {}",
                    claim.id, from, to
                )));
            }
        }
        let updated = self
            .store
            .update(claim.id, from, patch)
            .await
            .inspect_err(|err| warn!(claim_id = %claim.id, error = %err, "Transition lost a race"))?;
        info!(
            claim_id = %updated.id,
            owner = %updated.owner_id,
            from = %from,
            to = %updated.status,
            "Claim status changed"
        );
        Ok(updated)
    }
}

fn require_status(claim: &Claim, expected: ClaimStatus) -> Result<(), ClaimError> {
    if claim.status == expected {
        return Ok(());
    }
    warn!(claim_id = %claim.id, actual = %claim.status, %expected, "Transition rejected");
    Err(ClaimError::Conflict(format!(
        "{} is {}, expected {}",
        claim.id, claim.status, expected
    )))
}
