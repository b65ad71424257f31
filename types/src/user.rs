use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// An account as decoded from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub screen_name: String,
    pub name: String,
    #[serde(default)]
    pub protected: bool,
}

impl User {
    /// Returns a copy with every non-`None` field of `patch` applied.
    #[must_use]
    pub fn apply(&self, patch: &UserPatch) -> User {
        User {
            id: self.id,
            screen_name: patch
                .screen_name
                .clone()
                .unwrap_or_else(|| self.screen_name.clone()),
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            protected: patch.protected.unwrap_or(self.protected),
        }
    }
}

/// Partial account shape for profile updates.
///
/// Fields absent from the payload are left as-is on the target account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub screen_name: Option<String>,
    pub name: Option<String>,
    pub protected: Option<bool>,
}
