//! Timeline state engine for Roost - a pure reducer over feed events.
//!
//! This crate contains the timeline state machine without transport or
//! rendering dependencies. The transport decodes wire JSON into
//! [`Event`]s and hands them over one at a time, in arrival order; the
//! engine folds each into a new [`TimelinePair`] and reports what changed
//! in a [`TimelineDiff`] so a renderer can redraw incrementally.
//!
//! Every transition is total: malformed or unmatched input degrades to a
//! no-op carrying a [`Diagnostic`], never a fault.

mod config;
mod diff;
mod event;
mod filter;
mod focus;
mod notify;
mod slave;
mod state;
mod timeline;

pub use config::{DEFAULT_MAX_TIMELINE_ITEMS, EngineConfig, MuteConfig};
pub use diff::{Diagnostic, TimelineDiff, ViewDelta};
pub use event::{Event, FocusRequest};
pub use filter::{Admission, FilterPolicy, VetoPredicate};
pub use notify::{BadgeChange, Notified};
pub use slave::SlaveTimeline;
pub use state::{Engine, TimelineKind, TimelinePair};
pub use timeline::Timeline;

// Re-export the domain types so consumers that only link the engine can
// name everything the API surfaces.
pub use roost_types::{
    Activity, ActivityKind, Item, Status, StatusError, StatusId, User, UserId, UserPatch,
};
