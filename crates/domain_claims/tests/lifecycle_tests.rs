//! Lifecycle engine tests
//!
//! Every scenario runs against the in-memory store with a manual clock, so
//! grace windows and overdue thresholds are exercised minute by minute.

use std::sync::Arc;

use chrono::Duration;
use proptest::prelude::*;
use rust_decimal_macros::dec;

use core_kernel::ClaimId;
use domain_claims::{Attestations, ClaimStatus, ClaimStore};
use test_utils::{
    assert_claim_status, assert_conflict, assert_expired, assert_not_found,
    assert_review_invariant, assert_violations, lifecycle_ops_strategy, reason_strategy,
    valid_amount_strategy, invalid_amount_strategy, ClaimSubmissionBuilder, EngineHarness,
    LifecycleOp, OwnerFixtures, SubmissionFixtures,
};

// ============================================================================
// Filing
// ============================================================================

mod filing {
    use super::*;

    #[tokio::test]
    async fn test_file_claim_starts_submitted() {
        let h = EngineHarness::new();
        let claim = h.file_default().await.unwrap();

        assert_claim_status(&claim, ClaimStatus::Submitted);
        assert_eq!(claim.amount.value(), dec!(500));
        assert_eq!(claim.reason, "supplies");
        assert_eq!(claim.owner_id, OwnerFixtures::claimant());
        assert_eq!(claim.created_at, h.engine.now());
        assert!(claim.review_started_at.is_none());
    }

    #[tokio::test]
    async fn test_ids_increase_with_each_filing() {
        let h = EngineHarness::new();
        let first = h.file_default().await.unwrap();
        let second = h.file_for(&OwnerFixtures::other_claimant()).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_missing_attestation_is_a_field_error() {
        let h = EngineHarness::new();
        let result = h
            .engine
            .file_claim(
                &OwnerFixtures::claimant(),
                SubmissionFixtures::supplies(),
                Attestations {
                    receipt_signed: false,
                    ..Attestations::confirmed()
                },
            )
            .await;
        assert_violations(result, &["attestations.receipt_signed"]);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_blank_reason_and_missing_date_rejected() {
        let h = EngineHarness::new();
        let submission = ClaimSubmissionBuilder::new()
            .with_reason("  ")
            .with_invoice_date(None)
            .build();
        let result = h
            .engine
            .file_claim(&OwnerFixtures::claimant(), submission, Attestations::confirmed())
            .await;
        assert_violations(result, &["reason", "invoice_date"]);
    }

    #[tokio::test]
    async fn test_tax_id_none_marker_is_stored_as_absent() {
        let h = EngineHarness::new();
        let submission = ClaimSubmissionBuilder::new().with_tax_id("無").build();
        let claim = h
            .engine
            .file_claim(&OwnerFixtures::claimant(), submission, Attestations::confirmed())
            .await
            .unwrap();
        assert_eq!(claim.tax_id, None);
    }

    #[tokio::test]
    async fn test_random_reason_is_accepted() {
        let h = EngineHarness::new();
        let submission = ClaimSubmissionBuilder::new()
            .with_random_reason()
            .with_tax_id("04595257")
            .build();
        let claim = h
            .engine
            .file_claim(&OwnerFixtures::claimant(), submission, Attestations::confirmed())
            .await
            .unwrap();
        assert!(!claim.reason.is_empty());
        assert_eq!(claim.tax_id.as_deref(), Some("04595257"));
    }
}

// ============================================================================
// Review and undo
// ============================================================================

mod review {
    use super::*;

    #[tokio::test]
    async fn test_begin_review_sets_timestamp() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();

        assert_claim_status(&claim, ClaimStatus::Reviewing);
        assert_eq!(claim.review_started_at, Some(h.engine.now()));
    }

    #[tokio::test]
    async fn test_review_then_immediate_undo_restores_submitted() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        let undone = h.engine.undo_review(claim.id).await.unwrap();

        assert_claim_status(&undone, ClaimStatus::Submitted);
        assert!(undone.review_started_at.is_none());
    }

    #[tokio::test]
    async fn test_undo_at_59_minutes_succeeds() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        h.advance_minutes(59);
        assert!(h.engine.undo_review(claim.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_undo_at_61_minutes_expires() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        h.advance_minutes(61);
        assert_expired(h.engine.undo_review(claim.id).await);

        let stored = h.stored(claim.id).await.unwrap();
        assert_claim_status(&stored, ClaimStatus::Reviewing);
    }

    #[tokio::test]
    async fn test_expired_undo_reports_deadline() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        let started = claim.review_started_at.unwrap();
        h.advance_minutes(90);
        match h.engine.undo_review(claim.id).await {
            Err(domain_claims::ClaimError::TransitionExpired { claim_id, deadline }) => {
                assert_eq!(claim_id, claim.id);
                assert_eq!(deadline, started + Duration::hours(1));
            }
            other => panic!("expected TransitionExpired, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_double_begin_review_conflicts() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        assert_conflict(h.engine.begin_review(claim.id).await);
    }

    #[tokio::test]
    async fn test_undo_on_submitted_conflicts() {
        let h = EngineHarness::new();
        let claim = h.file_default().await.unwrap();
        assert_conflict(h.engine.undo_review(claim.id).await);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let h = EngineHarness::new();
        assert_not_found(h.engine.begin_review(ClaimId::new(404)).await);
        assert_not_found(h.engine.undo_review(ClaimId::new(404)).await);
        assert_not_found(h.engine.return_claim(ClaimId::new(404)).await);
    }
}

// ============================================================================
// Claimant view
// ============================================================================

mod claimant_view {
    use super::*;

    #[tokio::test]
    async fn test_review_hidden_for_first_hour() {
        let h = EngineHarness::new();
        h.file_and_review().await.unwrap();
        h.advance_minutes(30);

        let views = h.engine.list_mine(&OwnerFixtures::claimant()).await.unwrap();
        assert_eq!(views[0].display_status, ClaimStatus::Submitted);
        assert!(views[0].can_delete);
        assert!(!views[0].can_mark_received);
    }

    #[tokio::test]
    async fn test_review_visible_after_grace() {
        let h = EngineHarness::new();
        h.file_and_review().await.unwrap();
        h.advance_minutes(61);

        let views = h.engine.list_mine(&OwnerFixtures::claimant()).await.unwrap();
        assert_eq!(views[0].display_status, ClaimStatus::Reviewing);
        assert!(!views[0].can_delete);
        assert!(views[0].can_mark_received);
    }

    #[tokio::test]
    async fn test_list_mine_only_shows_own_claims_newest_first() {
        let h = EngineHarness::new();
        let first = h.file_default().await.unwrap();
        h.file_for(&OwnerFixtures::other_claimant()).await.unwrap();
        let third = h.file_default().await.unwrap();

        let views = h.engine.list_mine(&OwnerFixtures::claimant()).await.unwrap();
        let ids: Vec<ClaimId> = views.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![third.id, first.id]);
    }

    #[tokio::test]
    async fn test_mark_received_blocked_during_grace() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        h.advance_minutes(59);
        assert_conflict(h.engine.mark_received(&OwnerFixtures::claimant(), claim.id).await);
    }

    #[tokio::test]
    async fn test_mark_received_blocked_while_submitted() {
        let h = EngineHarness::new();
        let claim = h.file_default().await.unwrap();
        assert_conflict(h.engine.mark_received(&OwnerFixtures::claimant(), claim.id).await);
    }

    #[tokio::test]
    async fn test_mark_received_after_grace_completes_claim() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        let started = claim.review_started_at;
        h.advance_minutes(61);

        let done = h
            .engine
            .mark_received(&OwnerFixtures::claimant(), claim.id)
            .await
            .unwrap();
        assert_claim_status(&done, ClaimStatus::Done);
        assert_eq!(done.review_started_at, started);
        assert_review_invariant(&done);
    }

    #[tokio::test]
    async fn test_other_claimant_cannot_touch_claim() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        h.advance_minutes(61);

        let intruder = OwnerFixtures::other_claimant();
        assert_not_found(h.engine.mark_received(&intruder, claim.id).await);
        assert_not_found(h.engine.delete_mine(&intruder, claim.id).await);
        assert!(h.stored(claim.id).await.is_some());
    }
}

// ============================================================================
// Deletion and the delete/undo race
// ============================================================================

mod deletion {
    use super::*;

    #[tokio::test]
    async fn test_delete_submitted_claim() {
        let h = EngineHarness::new();
        let claim = h.file_default().await.unwrap();
        h.engine
            .delete_mine(&OwnerFixtures::claimant(), claim.id)
            .await
            .unwrap();
        assert!(h.stored(claim.id).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_wins_over_hidden_review() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        h.advance_minutes(20);

        h.engine
            .delete_mine(&OwnerFixtures::claimant(), claim.id)
            .await
            .unwrap();
        assert!(h.stored(claim.id).await.is_none());

        assert_not_found(h.engine.undo_review(claim.id).await);
    }

    #[tokio::test]
    async fn test_delete_blocked_once_review_is_visible() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        h.advance_minutes(61);
        assert_conflict(h.engine.delete_mine(&OwnerFixtures::claimant(), claim.id).await);
        assert!(h.stored(claim.id).await.is_some());
    }

    #[tokio::test]
    async fn test_delete_returned_claim() {
        let h = EngineHarness::new();
        let claim = h.file_default().await.unwrap();
        h.engine.return_claim(claim.id).await.unwrap();
        h.engine
            .delete_mine(&OwnerFixtures::claimant(), claim.id)
            .await
            .unwrap();
        assert!(h.stored(claim.id).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let h = EngineHarness::new();
        assert_not_found(
            h.engine
                .delete_mine(&OwnerFixtures::claimant(), ClaimId::new(77))
                .await,
        );
    }

    #[tokio::test]
    async fn test_concurrent_delete_and_undo_leave_consistent_state() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        h.advance_minutes(5);

        let owner = OwnerFixtures::claimant();
        let (deleted, undone) = tokio::join!(
            h.engine.delete_mine(&owner, claim.id),
            h.engine.undo_review(claim.id),
        );

        match h.stored(claim.id).await {
            None => assert!(deleted.is_ok()),
            // Undo moved the claim first, so the delete saw a stale status
            Some(stored) => {
                assert!(deleted.is_err());
                assert!(undone.is_ok());
                assert_claim_status(&stored, ClaimStatus::Submitted);
            }
        }
    }
}

// ============================================================================
// Administrator list and returns
// ============================================================================

mod administration {
    use super::*;

    #[tokio::test]
    async fn test_return_only_from_submitted() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        assert_conflict(h.engine.return_claim(claim.id).await);

        let other = h.file_default().await.unwrap();
        let returned = h.engine.return_claim(other.id).await.unwrap();
        assert_claim_status(&returned, ClaimStatus::Returned);
        assert!(returned.review_started_at.is_none());
    }

    #[tokio::test]
    async fn test_returned_claim_is_stuck() {
        let h = EngineHarness::new();
        let claim = h.file_default().await.unwrap();
        h.engine.return_claim(claim.id).await.unwrap();

        assert_conflict(h.engine.begin_review(claim.id).await);
        assert_conflict(h.engine.return_claim(claim.id).await);
        assert_conflict(h.engine.mark_received(&OwnerFixtures::claimant(), claim.id).await);
    }

    #[tokio::test]
    async fn test_pending_excludes_done_and_flags_overdue() {
        let h = EngineHarness::new();
        let old = h.file_default().await.unwrap();
        let finished = h.file_default().await.unwrap();
        h.engine.begin_review(finished.id).await.unwrap();
        h.advance_days(6);
        let fresh = h.file_default().await.unwrap();
        h.engine
            .mark_received(&OwnerFixtures::claimant(), finished.id)
            .await
            .unwrap();

        let pending = h.engine.list_pending().await.unwrap();
        let ids: Vec<ClaimId> = pending.iter().map(|p| p.claim.id).collect();
        assert_eq!(ids, vec![old.id, fresh.id]);
        assert!(pending[0].is_overdue);
        assert!(!pending[1].is_overdue);
    }

    #[tokio::test]
    async fn test_overdue_never_forces_a_transition() {
        let h = EngineHarness::new();
        let claim = h.file_default().await.unwrap();
        h.advance_days(30);
        let pending = h.engine.list_pending().await.unwrap();
        assert!(pending[0].is_overdue);
        assert_claim_status(&h.stored(claim.id).await.unwrap(), ClaimStatus::Submitted);
    }

    #[tokio::test]
    async fn test_reviewing_claims_are_never_overdue() {
        let h = EngineHarness::new();
        let claim = h.file_and_review().await.unwrap();
        h.advance_days(10);
        let pending = h.engine.list_pending().await.unwrap();
        assert_eq!(pending[0].claim.id, claim.id);
        assert!(!pending[0].is_overdue);
        assert_eq!(pending[0].undo_deadline, None);
    }
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_full_claim_lifecycle() {
    let h = EngineHarness::new();
    let owner = OwnerFixtures::claimant();

    let claim = h
        .engine
        .file_claim(&owner, SubmissionFixtures::supplies(), Attestations::confirmed())
        .await
        .unwrap();
    assert_claim_status(&claim, ClaimStatus::Submitted);

    let reviewing = h.engine.begin_review(claim.id).await.unwrap();
    let t0 = reviewing.review_started_at.unwrap();
    assert_eq!(t0, h.engine.now());

    h.advance_minutes(10);
    let view = &h.engine.list_mine(&owner).await.unwrap()[0];
    assert_eq!(view.display_status, ClaimStatus::Submitted);
    assert!(view.can_delete);

    let undone = h.engine.undo_review(claim.id).await.unwrap();
    assert_claim_status(&undone, ClaimStatus::Submitted);
    assert!(undone.review_started_at.is_none());

    let again = h.engine.begin_review(claim.id).await.unwrap();
    let t1 = again.review_started_at.unwrap();
    assert!(t1 > t0);

    h.advance_minutes(70);
    let view = &h.engine.list_mine(&owner).await.unwrap()[0];
    assert_eq!(view.display_status, ClaimStatus::Reviewing);
    assert!(view.can_mark_received);

    let done = h.engine.mark_received(&owner, claim.id).await.unwrap();
    assert_claim_status(&done, ClaimStatus::Done);

    assert_conflict(h.engine.delete_mine(&owner, claim.id).await);
    assert_conflict(h.engine.undo_review(claim.id).await);
    assert_conflict(h.engine.mark_received(&owner, claim.id).await);
    assert!(h.engine.list_pending().await.unwrap().is_empty());
}

// ============================================================================
// Properties
// ============================================================================

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_review_timestamp_invariant_holds(ops in lifecycle_ops_strategy(24)) {
        let rt = runtime();
        rt.block_on(async {
            let h = EngineHarness::new();
            let owner = OwnerFixtures::claimant();
            let claim = h.file_default().await.unwrap();
            let mut reviewed = false;

            for op in ops {
                let _ = match op {
                    LifecycleOp::BeginReview => h.engine.begin_review(claim.id).await.map(|_| ()),
                    LifecycleOp::UndoReview => h.engine.undo_review(claim.id).await.map(|_| ()),
                    LifecycleOp::ReturnClaim => h.engine.return_claim(claim.id).await.map(|_| ()),
                    LifecycleOp::MarkReceived => {
                        h.engine.mark_received(&owner, claim.id).await.map(|_| ())
                    }
                    LifecycleOp::Delete => h.engine.delete_mine(&owner, claim.id).await,
                    LifecycleOp::Wait { minutes } => {
                        h.advance_minutes(minutes);
                        Ok(())
                    }
                };

                let Some(stored) = h.stored(claim.id).await else { break };
                if stored.status == ClaimStatus::Reviewing {
                    reviewed = true;
                }
                assert_review_invariant(&stored);
                if stored.status == ClaimStatus::Done {
                    assert!(reviewed);
                    assert!(stored.review_started_at.is_some());
                }
            }
        });
    }

    #[test]
    fn prop_valid_submissions_are_admitted(amount in valid_amount_strategy(), reason in reason_strategy()) {
        let rt = runtime();
        let claim = rt.block_on(async {
            let h = EngineHarness::new();
            let submission = ClaimSubmissionBuilder::new()
                .with_amount(amount)
                .with_reason(reason)
                .build();
            h.engine
                .file_claim(&OwnerFixtures::claimant(), submission, Attestations::confirmed())
                .await
        });
        prop_assert!(claim.is_ok());
    }

    #[test]
    fn prop_out_of_range_amounts_are_rejected(amount in invalid_amount_strategy()) {
        let rt = runtime();
        let result = rt.block_on(async {
            let h = EngineHarness::new();
            let submission = ClaimSubmissionBuilder::new().with_amount(amount).build();
            h.engine
                .file_claim(&OwnerFixtures::claimant(), submission, Attestations::confirmed())
                .await
        });
        assert_violations(result, &["amount"]);
    }

    #[test]
    fn prop_display_lags_exactly_one_grace_window(minutes in 0i64..180i64) {
        let rt = runtime();
        let shown = rt.block_on(async {
            let h = EngineHarness::new();
            h.file_and_review().await.unwrap();
            h.advance_minutes(minutes);
            h.engine.list_mine(&OwnerFixtures::claimant()).await.unwrap()[0].display_status
        });
        let expected = if minutes < 60 { ClaimStatus::Submitted } else { ClaimStatus::Reviewing };
        prop_assert_eq!(shown, expected);
    }
}

#[tokio::test]
async fn test_engine_can_be_shared_across_tasks() {
    let h = EngineHarness::new();
    let engine = Arc::new(h.engine.clone());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .file_claim(
                    &OwnerFixtures::claimant(),
                    SubmissionFixtures::supplies(),
                    Attestations::confirmed(),
                )
                .await
                .map(|c| c.id)
        }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(h.store.list_all().await.unwrap().len(), 8);
}
