//! Timing and admission parameters of the lifecycle

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use core_kernel::money::DEFAULT_AMOUNT_CEILING;
use core_kernel::CoreError;

/// Length of the administrator undo window
pub const DEFAULT_GRACE_WINDOW_SECS: i64 = 60 * 60;

/// Age after which a submitted claim is flagged for attention
pub const DEFAULT_OVERDUE_AFTER_DAYS: i64 = 5;

/// Parameters the engine evaluates its rules against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Undo is allowed, and the claimant view lags, for this long after review starts
    pub grace_window: Duration,
    /// Submitted claims older than this are overdue
    pub overdue_after: Duration,
    /// Largest admissible amount
    pub amount_ceiling: Decimal,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            grace_window: Duration::seconds(DEFAULT_GRACE_WINDOW_SECS),
            overdue_after: Duration::days(DEFAULT_OVERDUE_AFTER_DAYS),
            amount_ceiling: DEFAULT_AMOUNT_CEILING,
        }
    }
}

impl LifecyclePolicy {
    /// Builds a policy from raw settings
    pub fn new(
        grace_window: Duration,
        overdue_after: Duration,
        amount_ceiling: Decimal,
    ) -> Result<Self, CoreError> {
        if grace_window <= Duration::zero() {
            return Err(CoreError::configuration("grace window must be positive"));
        }
        if overdue_after <= Duration::zero() {
            return Err(CoreError::configuration("overdue threshold must be positive"));
        }
        if amount_ceiling <= Decimal::ZERO {
            return Err(CoreError::configuration("amount ceiling must be positive"));
        }
        Ok(Self {
            grace_window,
            overdue_after,
            amount_ceiling,
        })
    }

    /// True while `now` is strictly inside the grace window opened at `started`
    pub fn within_grace(&self, started: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - started < self.grace_window
    }

    /// Instant at which the grace window opened at `started` closes
    pub fn grace_deadline(&self, started: DateTime<Utc>) -> DateTime<Utc> {
        started + self.grace_window
    }

    /// True once a claim filed at `created` has waited past the threshold
    pub fn is_past_overdue(&self, created: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - created > self.overdue_after
    }
}
