use roost_types::{StatusError, StatusId};

use crate::notify::BadgeChange;
use crate::state::TimelineKind;

/// A recoverable fault absorbed by the engine. Surfaced for logging and
/// telemetry; the transition that produced it left the state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("malformed status payload: {0}")]
    MalformedStatus(#[from] StatusError),
    #[error("{kind} backfill target at index {index} is not a gap")]
    NotAGap { kind: TimelineKind, index: usize },
    #[error("current user is not set")]
    UserNotSet,
}

/// How one view changed during a transition.
///
/// Insertion positions are relative to the view at the moment of that
/// insertion within the transition; removals name the logical status the
/// dropped row stood for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewDelta {
    pub inserted_at: Vec<usize>,
    pub removed_ids: Vec<StatusId>,
    /// Rows were patched in place, order unchanged.
    pub updated: bool,
}

impl ViewDelta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserted_at.is_empty() && self.removed_ids.is_empty() && !self.updated
    }
}

/// Compact change descriptor for one applied event, so a renderer can
/// redraw incrementally instead of re-rendering both views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineDiff {
    /// Whether the transition changed any observable state. `false`
    /// means the returned pair is interchangeable with its predecessor.
    pub changed: bool,
    pub home: ViewDelta,
    pub mention: ViewDelta,
    pub focus_moved: bool,
    pub badge: Option<BadgeChange>,
    pub diagnostic: Option<Diagnostic>,
}

impl TimelineDiff {
    pub(crate) fn unchanged() -> Self {
        Self::default()
    }

    pub(crate) fn with_diagnostic(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostic: Some(diagnostic),
            ..Self::default()
        }
    }

    /// Fold a later per-item diff into this one (batched events).
    pub(crate) fn absorb(&mut self, other: TimelineDiff) {
        self.changed |= other.changed;
        self.home.inserted_at.extend(other.home.inserted_at);
        self.home.removed_ids.extend(other.home.removed_ids);
        self.home.updated |= other.home.updated;
        self.mention.inserted_at.extend(other.mention.inserted_at);
        self.mention.removed_ids.extend(other.mention.removed_ids);
        self.mention.updated |= other.mention.updated;
        self.focus_moved |= other.focus_moved;
        if other.badge.is_some() {
            self.badge = other.badge;
        }
        if self.diagnostic.is_none() {
            self.diagnostic = other.diagnostic;
        }
    }

    pub(crate) fn view_mut(&mut self, kind: TimelineKind) -> &mut ViewDelta {
        match kind {
            TimelineKind::Home => &mut self.home,
            TimelineKind::Mention => &mut self.mention,
        }
    }
}
