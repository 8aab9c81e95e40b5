//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! reimbursement tracker test suite.
//!
//! # Modules
//!
//! - `fixtures`: Fixed instants, owners, and submissions
//! - `builders`: Builders for submissions and a ready-to-drive engine harness
//! - `database`: PostgreSQL test container management
//! - `assertions`: Assertion helpers for claim state and errors
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
