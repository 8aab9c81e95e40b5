//! In-memory claim store
//!
//! Keeps every record in a single map behind one async `RwLock`. Each
//! compare-and-apply runs inside one write-lock critical section, which is
//! what makes it atomic with respect to every other caller.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use core_kernel::{
    AdapterHealth, ClaimId, DomainPort, HealthCheckResult, HealthCheckable, OwnerId, PortError,
};

use crate::claim::{Claim, ClaimPatch, ClaimStatus, NewClaim};
use crate::ports::{check_new_claim, stale_precondition, ClaimStore};

#[derive(Debug)]
struct Inner {
    claims: BTreeMap<ClaimId, Claim>,
    last_id: ClaimId,
}

/// Claim store backed by process memory
#[derive(Debug)]
pub struct InMemoryClaimStore {
    inner: RwLock<Inner>,
}

impl Default for InMemoryClaimStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClaimStore {
    /// Creates an empty store; the first id handed out is `CLM-1`
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                claims: BTreeMap::new(),
                last_id: ClaimId::new(0),
            }),
        }
    }

    /// Number of stored claims
    pub async fn len(&self) -> usize {
        self.inner.read().await.claims.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.claims.is_empty()
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl HealthCheckable for InMemoryClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "in-memory-claim-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: Some("In-memory store always healthy".to_string()),
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn create(&self, claim: NewClaim) -> Result<Claim, PortError> {
        check_new_claim(&claim)?;
        let mut inner = self.inner.write().await;
        let id = inner.last_id.next();
        inner.last_id = id;
        let record = Claim::from_new(id, claim);
        inner.claims.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
        self.inner
            .read()
            .await
            .claims
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", id))
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Claim>, PortError> {
        let inner = self.inner.read().await;
        Ok(inner
            .claims
            .values()
            .filter(|c| c.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Claim>, PortError> {
        Ok(self.inner.read().await.claims.values().cloned().collect())
    }

    async fn update(
        &self,
        id: ClaimId,
        expected: ClaimStatus,
        patch: ClaimPatch,
    ) -> Result<Claim, PortError> {
        let mut inner = self.inner.write().await;
        let claim = inner
            .claims
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Claim", id))?;
        if claim.status != expected {
            return Err(stale_precondition(id, expected, claim.status));
        }
        patch.apply(claim);
        Ok(claim.clone())
    }

    async fn delete(&self, id: ClaimId, expected: Option<ClaimStatus>) -> Result<(), PortError> {
        let mut inner = self.inner.write().await;
        let current = inner
            .claims
            .get(&id)
            .map(|c| c.status)
            .ok_or_else(|| PortError::not_found("Claim", id))?;
        if let Some(expected) = expected {
            if current != expected {
                return Err(stale_precondition(id, expected, current));
            }
        }
        inner.claims.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::Amount;
    use rust_decimal_macros::dec;

    fn new_claim(owner: &str) -> NewClaim {
        NewClaim {
            owner_id: OwnerId::new(owner),
            amount: Amount::new(dec!(80)).unwrap(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            reason: "toner".to_string(),
            tax_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let store = InMemoryClaimStore::new();
        let first = store.create(new_claim("a")).await.unwrap();
        let second = store.create(new_claim("a")).await.unwrap();
        assert_eq!(first.id, ClaimId::new(1));
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = InMemoryClaimStore::new();
        let first = store.create(new_claim("a")).await.unwrap();
        store.delete(first.id, None).await.unwrap();
        let second = store.create(new_claim("a")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_reason() {
        let store = InMemoryClaimStore::new();
        let mut claim = new_claim("a");
        claim.reason = "  ".to_string();
        let err = store.create(claim).await.unwrap_err();
        assert!(matches!(err, PortError::Validation { .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = InMemoryClaimStore::new();
        assert!(store.get(ClaimId::new(9)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_by_owner_filters() {
        let store = InMemoryClaimStore::new();
        store.create(new_claim("a")).await.unwrap();
        store.create(new_claim("b")).await.unwrap();
        store.create(new_claim("a")).await.unwrap();

        let mine = store.list_by_owner(&OwnerId::new("a")).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_checks_expected_status() {
        let store = InMemoryClaimStore::new();
        let claim = store.create(new_claim("a")).await.unwrap();

        let err = store
            .update(claim.id, ClaimStatus::Reviewing, ClaimPatch::done())
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let updated = store
            .update(claim.id, ClaimStatus::Submitted, ClaimPatch::returned())
            .await
            .unwrap();
        assert_eq!(updated.status, ClaimStatus::Returned);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryClaimStore::new();
        let err = store
            .update(ClaimId::new(4), ClaimStatus::Submitted, ClaimPatch::returned())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_with_stale_status_keeps_record() {
        let store = InMemoryClaimStore::new();
        let claim = store.create(new_claim("a")).await.unwrap();
        let err = store
            .delete(claim.id, Some(ClaimStatus::Returned))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.len().await, 1);

        store.delete(claim.id, Some(ClaimStatus::Submitted)).await.unwrap();
        assert!(store.get(claim.id).await.unwrap_err().is_not_found());
        assert!(store.delete(claim.id, None).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_health_check() {
        let store = InMemoryClaimStore::new();
        assert!(store.health_check().await.is_healthy());
    }
}
