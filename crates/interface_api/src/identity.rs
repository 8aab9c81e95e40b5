//! Staff identity resolution
//!
//! Login is a lookup of a raw credential (the staff member's national id
//! number) in a roster. The lookup sits behind `IdentityResolver` so the
//! roster can later move to a directory service without touching handlers.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, OwnerId};

use crate::config::StaffEntry;

/// What a logged-in user may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Files and follows their own claims
    Staff,
    /// Also works the pending list; administrators can file claims too
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }
}

/// A resolved user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub role: Role,
}

impl Identity {
    /// The owner id recorded on claims this user files
    pub fn owner_id(&self) -> OwnerId {
        OwnerId::new(self.name.clone())
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Maps a raw credential to an identity
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `None` when the credential is unknown
    async fn resolve(&self, credential: &str) -> Option<Identity>;
}

/// Roster loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaffDirectory {
    by_credential: HashMap<String, Identity>,
}

impl StaffDirectory {
    /// Builds the directory, rejecting blank or duplicated entries
    pub fn from_entries(entries: &[StaffEntry]) -> Result<Self, CoreError> {
        let mut by_credential = HashMap::with_capacity(entries.len());
        for entry in entries {
            let credential = normalize_credential(&entry.credential);
            let name = entry.name.trim();
            if credential.is_empty() || name.is_empty() {
                return Err(CoreError::configuration(
                    "staff entries need a credential and a name",
                ));
            }
            let identity = Identity {
                name: name.to_string(),
                role: entry.role,
            };
            if by_credential.insert(credential, identity).is_some() {
                return Err(CoreError::configuration(format!(
                    "duplicate staff credential for {}",
                    name
                )));
            }
        }
        Ok(Self { by_credential })
    }

    pub fn len(&self) -> usize {
        self.by_credential.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_credential.is_empty()
    }
}

#[async_trait]
impl IdentityResolver for StaffDirectory {
    async fn resolve(&self, credential: &str) -> Option<Identity> {
        self.by_credential
            .get(&normalize_credential(credential))
            .cloned()
    }
}

/// Id numbers are compared trimmed and upper-cased
fn normalize_credential(raw: &str) -> String {
    raw.trim().to_uppercase()
}
