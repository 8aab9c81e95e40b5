//! Strongly-typed identifiers for domain entities
//!
//! Newtype wrappers keep claim ids and claimant identities from being mixed
//! up with each other or with raw integers and strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Display prefix for claim identifiers
const CLAIM_PREFIX: &str = "CLM";

/// Identifier of a reimbursement claim
///
/// Claim ids are assigned by the store from a strictly increasing sequence,
/// so ordering by id is ordering by filing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(u64);

impl ClaimId {
    /// Creates an identifier from its sequence number
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the sequence number
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the next identifier in sequence
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the identifier prefix for display
    pub fn prefix() -> &'static str {
        CLAIM_PREFIX
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", CLAIM_PREFIX, self.0)
    }
}

impl FromStr for ClaimId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Strip prefix if present
        let raw = s
            .strip_prefix(CLAIM_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(s);
        Ok(Self(raw.parse()?))
    }
}

impl From<u64> for ClaimId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ClaimId> for u64 {
    fn from(id: ClaimId) -> u64 {
        id.0
    }
}

/// Identity of the staff member who filed a claim
///
/// The value is the resolved name handed over by identity resolution; the
/// engine trusts it and performs no authentication of its own.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
