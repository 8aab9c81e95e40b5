//! Claim store adapters that live alongside the domain

pub mod in_memory;

pub use in_memory::InMemoryClaimStore;
