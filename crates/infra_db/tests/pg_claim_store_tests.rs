//! PostgreSQL claim store tests
//!
//! These start a throwaway Postgres container and are ignored by default.
//! Run with `cargo test -p infra_db -- --ignored` on a machine with Docker.

use std::sync::Arc;

use core_kernel::{Amount, ClaimId, ManualClock};
use domain_claims::{
    Attestations, ClaimPatch, ClaimStatus, ClaimStore, LifecycleEngine, LifecyclePolicy, NewClaim,
};
use infra_db::PgClaimStore;
use rust_decimal_macros::dec;
use test_utils::{OwnerFixtures, SubmissionFixtures, TemporalFixtures, TestDatabase};

fn new_claim() -> NewClaim {
    NewClaim {
        owner_id: OwnerFixtures::claimant(),
        amount: Amount::new(dec!(500)).unwrap(),
        invoice_date: TemporalFixtures::invoice_date(),
        reason: "supplies".to_string(),
        tax_id: Some("12345678".to_string()),
        created_at: TemporalFixtures::epoch(),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_get_round_trip() {
    let db = TestDatabase::new().await.unwrap();
    let store = PgClaimStore::new(db.pool().clone());

    let created = store.create(new_claim()).await.unwrap();
    let fetched = store.get(created.id).await.unwrap();

    assert_eq!(created, fetched);
    assert_eq!(fetched.status, ClaimStatus::Submitted);
    assert_eq!(fetched.tax_id.as_deref(), Some("12345678"));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_ids_are_not_reused() {
    let db = TestDatabase::new().await.unwrap();
    let store = PgClaimStore::new(db.pool().clone());

    let first = store.create(new_claim()).await.unwrap();
    store.delete(first.id, None).await.unwrap();
    let second = store.create(new_claim()).await.unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_guarded_update_distinguishes_conflict_and_missing() {
    let db = TestDatabase::new().await.unwrap();
    let store = PgClaimStore::new(db.pool().clone());
    let claim = store.create(new_claim()).await.unwrap();

    let started = TemporalFixtures::epoch();
    let reviewing = store
        .update(claim.id, ClaimStatus::Submitted, ClaimPatch::begin_review(started))
        .await
        .unwrap();
    assert_eq!(reviewing.status, ClaimStatus::Reviewing);
    assert_eq!(reviewing.review_started_at, Some(started));

    let stale = store
        .update(claim.id, ClaimStatus::Submitted, ClaimPatch::returned())
        .await
        .unwrap_err();
    assert!(stale.is_conflict());

    let missing = store
        .update(ClaimId::new(9_999), ClaimStatus::Submitted, ClaimPatch::returned())
        .await
        .unwrap_err();
    assert!(missing.is_not_found());

    let undone = store
        .update(claim.id, ClaimStatus::Reviewing, ClaimPatch::undo_review())
        .await
        .unwrap();
    assert_eq!(undone.status, ClaimStatus::Submitted);
    assert!(undone.review_started_at.is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_guarded_delete() {
    let db = TestDatabase::new().await.unwrap();
    let store = PgClaimStore::new(db.pool().clone());
    let claim = store.create(new_claim()).await.unwrap();

    let err = store
        .delete(claim.id, Some(ClaimStatus::Reviewing))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    store.delete(claim.id, Some(ClaimStatus::Submitted)).await.unwrap();
    assert!(store.get(claim.id).await.unwrap_err().is_not_found());
    assert!(store
        .delete(claim.id, Some(ClaimStatus::Submitted))
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_engine_runs_on_postgres() {
    let db = TestDatabase::new().await.unwrap();
    let clock = ManualClock::at(TemporalFixtures::epoch());
    let engine = LifecycleEngine::new(
        Arc::new(PgClaimStore::new(db.pool().clone())),
        Arc::new(clock.clone()),
        LifecyclePolicy::default(),
    );
    let owner = OwnerFixtures::claimant();

    let claim = engine
        .file_claim(&owner, SubmissionFixtures::supplies(), Attestations::confirmed())
        .await
        .unwrap();
    engine.begin_review(claim.id).await.unwrap();

    clock.advance(chrono::Duration::minutes(61));
    assert!(engine.undo_review(claim.id).await.unwrap_err().is_expired());

    let done = engine.mark_received(&owner, claim.id).await.unwrap();
    assert_eq!(done.status, ClaimStatus::Done);
    assert!(engine.list_pending().await.unwrap().is_empty());

    db.clear_data().await.unwrap();
    assert!(engine.list_mine(&owner).await.unwrap().is_empty());
}
