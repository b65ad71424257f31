use roost_types::{Item, Status, StatusId, User, UserId, UserPatch};

use crate::state::TimelineKind;

/// Keyboard-focus requests over the active view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequest {
    /// Move down one row; from no focus, jump to the top.
    Next,
    /// Move up one row; from no focus, stay unfocused.
    Prev,
    Top,
    Bottom,
    On(usize),
    Clear,
}

/// One decoded inbound event.
///
/// The surrounding system serializes every source (stream, user actions,
/// pagination responses) into a single arrival order before handing
/// events to the engine, one at a time.
#[derive(Debug, Clone)]
pub enum Event {
    /// A status arrived on the stream.
    NewStatus(Status),
    /// A block of statuses, folded in order.
    NewStatuses(Vec<Status>),
    /// A fetched mention backlog, newest first, prepended as a block.
    BackfillMentions(Vec<Status>),
    /// A pagination response resolving the gap at `index`.
    Backfill {
        kind: TimelineKind,
        index: usize,
        items: Vec<Item>,
    },
    DeleteStatus(StatusId),
    /// The service confirmed our repost; patch the status everywhere.
    RepostConfirmed(Status),
    UnrepostConfirmed(Status),
    LikeConfirmed(Status),
    UnlikeConfirmed(Status),
    /// Someone else liked a status of ours.
    Liked { status: Status, by: User },
    /// Someone else followed us; the payload carries their latest status
    /// as the row to aggregate under.
    Followed { status: Status, by: User },
    AddRejectedIds(Vec<UserId>),
    RemoveRejectedIds(Vec<UserId>),
    AddNoRepostIds(Vec<UserId>),
    SetUser(User),
    UpdateUser(UserPatch),
    AddFriends(Vec<UserId>),
    RemoveFriends(Vec<UserId>),
    ResetFriends(Vec<UserId>),
    /// The stream dropped; mark the discontinuity with a gap.
    ConnectionLost,
    SwitchTimeline(TimelineKind),
    Focus(FocusRequest),
}
