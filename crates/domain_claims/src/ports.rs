//! Claims Domain Ports
//!
//! The `ClaimStore` trait is the only way the engine touches claim records.
//! It is a plain mapping with CRUD semantics; all business rules live in the
//! engine. Adapters:
//!
//! - **In-memory** (`adapters::InMemoryClaimStore`): single process, no persistence
//! - **PostgreSQL** (`infra_db::PgClaimStore`)
//!
//! # Concurrency
//!
//! Stores take no long-lived locks. Every mutation is a compare-and-apply:
//! the caller states the status it last observed and the store applies the
//! change in one atomic step only if that status still holds, reporting
//! `PortError::Conflict` otherwise.
//!
//! ```rust,ignore
//! let claim = store.get(id).await?;
//! store.update(id, claim.status, ClaimPatch::returned()).await?;
//! ```

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, OwnerId, PortError};

use crate::claim::{Claim, ClaimPatch, ClaimStatus, NewClaim};

/// Storage port for claim records
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    /// Persists an admitted claim under a fresh, strictly increasing id
    ///
    /// Fails with `PortError::Validation` if the record breaks an
    /// immutable-field constraint.
    async fn create(&self, claim: NewClaim) -> Result<Claim, PortError>;

    /// Retrieves a claim by id, or `PortError::NotFound`
    async fn get(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// All claims filed by one owner, in no particular order
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Claim>, PortError>;

    /// Every stored claim, in no particular order
    async fn list_all(&self) -> Result<Vec<Claim>, PortError>;

    /// Applies a patch if the stored status still equals `expected`
    ///
    /// Returns the updated record.
    async fn update(
        &self,
        id: ClaimId,
        expected: ClaimStatus,
        patch: ClaimPatch,
    ) -> Result<Claim, PortError>;

    /// Removes a claim, optionally only if its status still equals `expected`
    async fn delete(&self, id: ClaimId, expected: Option<ClaimStatus>) -> Result<(), PortError>;
}

/// Builds the conflict error every adapter reports on a stale precondition
pub fn stale_precondition(id: ClaimId, expected: ClaimStatus, actual: ClaimStatus) -> PortError {
    PortError::conflict(format!(
        "{} is {}, expected {}",
        id, actual, expected
    ))
}

/// Re-checks an admitted claim before it is written
pub fn check_new_claim(claim: &NewClaim) -> Result<(), PortError> {
    match claim.violations().into_iter().next() {
        Some(violation) => Err(PortError::validation_field(violation.message, violation.field)),
        None => Ok(()),
    }
}
