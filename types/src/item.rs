use std::collections::HashSet;
use std::sync::Arc;

use crate::ids::UserId;
use crate::status::Status;
use crate::user::User;

/// What a group of actors did to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Repost,
    Like,
    Follow,
}

impl ActivityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Repost => "repost",
            ActivityKind::Like => "like",
            ActivityKind::Follow => "follow",
        }
    }
}

/// One aggregated mention row: every account that did `kind` to `status`,
/// newest actor first.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub kind: ActivityKind,
    pub status: Arc<Status>,
    pub by: Vec<Arc<User>>,
}

impl Activity {
    #[must_use]
    pub fn new(kind: ActivityKind, status: Arc<Status>, by: Arc<User>) -> Self {
        Self {
            kind,
            status,
            by: vec![by],
        }
    }

    /// Fold another actor into this row. The newest actor moves to the
    /// front; a repeated actor is not listed twice.
    #[must_use]
    pub fn merge(&self, status: Arc<Status>, by: Arc<User>) -> Activity {
        let mut actors = Vec::with_capacity(self.by.len() + 1);
        actors.push(Arc::clone(&by));
        actors.extend(
            self.by
                .iter()
                .filter(|actor| actor.id != by.id)
                .map(Arc::clone),
        );
        Activity {
            kind: self.kind,
            status,
            by: actors,
        }
    }

    /// Drop every actor whose id is in `ids`. Returns `None` when no actor
    /// remains, in which case the row has nothing left to show.
    #[must_use]
    pub fn without_actors(&self, ids: &HashSet<UserId>) -> Option<Activity> {
        let kept: Vec<Arc<User>> = self
            .by
            .iter()
            .filter(|actor| !ids.contains(&actor.id))
            .map(Arc::clone)
            .collect();
        if kept.is_empty() {
            return None;
        }
        Some(Activity {
            kind: self.kind,
            status: Arc::clone(&self.status),
            by: kept,
        })
    }
}

/// One row of an ordered timeline.
///
/// A closed union: rendering and the engine both match exhaustively, so a
/// new row shape is a compile error everywhere it matters.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Status(Arc<Status>),
    Activity(Activity),
    /// A discontinuity in history, e.g. after a reconnect. Carries no
    /// payload and is resolved later by a backfill.
    Gap,
}

impl Item {
    #[must_use]
    pub fn as_status(&self) -> Option<&Arc<Status>> {
        match self {
            Item::Status(status) => Some(status),
            Item::Activity(_) | Item::Gap => None,
        }
    }

    #[must_use]
    pub fn as_activity(&self) -> Option<&Activity> {
        match self {
            Item::Activity(activity) => Some(activity),
            Item::Status(_) | Item::Gap => None,
        }
    }

    #[must_use]
    pub fn is_gap(&self) -> bool {
        matches!(self, Item::Gap)
    }
}
