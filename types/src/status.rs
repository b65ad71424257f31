use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{StatusId, UserId};
use crate::user::User;

/// Why a decoded status payload was rejected before reaching a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// A repost wrapper whose target is itself a repost. The wire never
    /// produces this shape for a well-formed feed; repost wrappers always
    /// reference the original status directly.
    #[error("repost {outer} targets another repost (inner target {inner})")]
    NestedRepost { outer: StatusId, inner: StatusId },
}

/// A status as decoded from the wire.
///
/// `reposted_status` forms at most a 2-level chain: a repost wrapper
/// references the original, never another wrapper. `related_status_ids`
/// links a reply chain for display; it is replaced wholesale when the
/// chain changes, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub user: Arc<User>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub in_reply_to_status_id: Option<StatusId>,
    /// Ids of every account this status mentions.
    #[serde(default)]
    pub mention_ids: Vec<UserId>,
    #[serde(default)]
    pub reposted_status: Option<Arc<Status>>,
    #[serde(default)]
    pub quoted_status: Option<Arc<Status>>,
    #[serde(default)]
    pub reposted: bool,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub repost_count: u32,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub related_status_ids: Vec<StatusId>,
}

impl Status {
    /// The logical status this row stands for: the repost target when this
    /// is a repost wrapper, otherwise the status itself.
    #[must_use]
    pub fn main_status(&self) -> &Status {
        self.reposted_status.as_deref().unwrap_or(self)
    }

    #[must_use]
    pub fn main_status_id(&self) -> StatusId {
        self.main_status().id
    }

    #[must_use]
    pub fn author_id(&self) -> UserId {
        self.user.id
    }

    #[must_use]
    pub fn is_repost(&self) -> bool {
        self.reposted_status.is_some()
    }

    #[must_use]
    pub fn is_quote(&self) -> bool {
        self.quoted_status.is_some()
    }

    /// Whether this status mentions `user` by id.
    #[must_use]
    pub fn mentions_user(&self, user: UserId) -> bool {
        self.mention_ids.contains(&user)
    }

    /// Reject the one wire shape the type system cannot rule out.
    pub fn validate(&self) -> Result<(), StatusError> {
        if let Some(target) = &self.reposted_status
            && let Some(inner) = &target.reposted_status
        {
            return Err(StatusError::NestedRepost {
                outer: self.id,
                inner: inner.id,
            });
        }
        Ok(())
    }

    /// Returns a copy with `related_status_ids` replaced.
    #[must_use]
    pub fn with_related(&self, related: Vec<StatusId>) -> Status {
        Status {
            related_status_ids: related,
            ..self.clone()
        }
    }

    /// Returns a copy of this repost wrapper with its target swapped.
    /// On a non-repost this is a plain copy.
    #[must_use]
    pub fn with_repost_target(&self, target: Arc<Status>) -> Status {
        Status {
            reposted_status: Some(target),
            ..self.clone()
        }
    }
}
