//! Reimbursement Claims Domain
//!
//! This crate implements the lifecycle of a small reimbursement claim from
//! filing by a staff member to confirmation that the money arrived.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Submitted -> Reviewing -> Done
//!     |    <-(undo, 1h)-'
//!     '-> Returned
//! ```
//!
//! Claimants see a lagged view of the lifecycle: a review younger than the
//! grace window is shown as `Submitted`. See [`visibility`].

pub mod claim;
pub mod admission;
pub mod policy;
pub mod visibility;
pub mod ports;
pub mod adapters;
pub mod engine;
pub mod error;

pub use claim::{Claim, ClaimPatch, ClaimStatus, NewClaim};
pub use admission::{Attestations, ClaimSubmission, FieldViolation};
pub use policy::LifecyclePolicy;
pub use visibility::{ClaimantView, PendingClaim};
pub use ports::ClaimStore;
pub use adapters::InMemoryClaimStore;
pub use engine::LifecycleEngine;
pub use error::ClaimError;
