//! Core Kernel - Foundational types shared by the reimbursement tracker
//!
//! This crate provides the building blocks used across the workspace:
//! - Strongly-typed identifiers for claims and their owners
//! - A bounded, exact decimal `Amount` (no floating-point currency)
//! - A `Clock` abstraction so that time-based rules can be evaluated on demand
//! - Port markers and the adapter-boundary `PortError`

pub mod money;
pub mod clock;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Amount, MoneyError};
pub use clock::{Clock, SystemClock, ManualClock};
pub use identifiers::{ClaimId, OwnerId};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::CoreError;
