//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating claim inputs and sequences of
//! lifecycle operations.

use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for admissible amounts (0.01 ..= 10,000.00)
pub fn valid_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for amounts outside the admissible range
pub fn invalid_amount_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (-1_000_000i64..=0i64).prop_map(|cents| Decimal::new(cents, 2)),
        (1_000_001i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2)),
    ]
}

/// Strategy for non-blank reasons
pub fn reason_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,12}( [a-z]{1,12}){0,4}"
}

/// A single action taken by someone against a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    BeginReview,
    UndoReview,
    ReturnClaim,
    MarkReceived,
    Delete,
    /// Let wall-clock time pass
    Wait { minutes: i64 },
}

/// Strategy for one lifecycle operation
pub fn lifecycle_op_strategy() -> impl Strategy<Value = LifecycleOp> {
    prop_oneof![
        3 => Just(LifecycleOp::BeginReview),
        2 => Just(LifecycleOp::UndoReview),
        1 => Just(LifecycleOp::ReturnClaim),
        2 => Just(LifecycleOp::MarkReceived),
        1 => Just(LifecycleOp::Delete),
        3 => (1i64..120i64).prop_map(|minutes| LifecycleOp::Wait { minutes }),
    ]
}

/// Strategy for a run of lifecycle operations
pub fn lifecycle_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<LifecycleOp>> {
    prop::collection::vec(lifecycle_op_strategy(), 1..max_len)
}
