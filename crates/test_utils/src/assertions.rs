//! Custom Test Assertions
//!
//! Assertion helpers for claim state that give more meaningful failure
//! messages than a bare `assert_eq!`.

use domain_claims::{Claim, ClaimError, ClaimStatus};

/// Asserts the stored status of a claim
pub fn assert_claim_status(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(
        claim.status, expected,
        "Expected {} to be {}, found {}",
        claim.id, expected, claim.status
    );
}

/// Asserts that `review_started_at` agrees with the status
pub fn assert_review_invariant(claim: &Claim) {
    assert!(
        claim.review_timestamp_consistent(),
        "{} is {} but review_started_at is {:?}",
        claim.id,
        claim.status,
        claim.review_started_at
    );
}

/// Asserts that a result failed because the claim does not exist
pub fn assert_not_found<T: std::fmt::Debug>(result: Result<T, ClaimError>) {
    match result {
        Err(ClaimError::NotFound(_)) => {}
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

/// Asserts that a result failed on a status precondition
pub fn assert_conflict<T: std::fmt::Debug>(result: Result<T, ClaimError>) {
    match result {
        Err(ClaimError::Conflict(_)) => {}
        other => panic!("Expected Conflict, got {:?}", other),
    }
}

/// Asserts that an undo was attempted after the grace window
pub fn assert_expired<T: std::fmt::Debug>(result: Result<T, ClaimError>) {
    match result {
        Err(ClaimError::TransitionExpired { .. }) => {}
        other => panic!("Expected TransitionExpired, got {:?}", other),
    }
}

/// Asserts that admission rejected exactly the given fields (in any order)
pub fn assert_violations<T: std::fmt::Debug>(result: Result<T, ClaimError>, fields: &[&str]) {
    match result {
        Err(ClaimError::Validation(violations)) => {
            let mut actual: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
            let mut expected = fields.to_vec();
            actual.sort_unstable();
            expected.sort_unstable();
            assert_eq!(actual, expected, "Unexpected field violations");
        }
        other => panic!("Expected Validation error, got {:?}", other),
    }
}
