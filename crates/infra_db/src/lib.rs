//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for reimbursement claims using SQLx.
//!
//! # Architecture
//!
//! `PgClaimStore` implements the `ClaimStore` port from `domain_claims`, so
//! the lifecycle engine runs unchanged against memory or Postgres. Every
//! status change is a single conditional `UPDATE ... WHERE status = $n`,
//! which keeps compare-and-apply atomic without explicit locking.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PgClaimStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/reimburse")).await?;
//! run_migrations(&pool).await?;
//! let store = PgClaimStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::claims::PgClaimStore;
