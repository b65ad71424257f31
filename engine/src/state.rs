use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use roost_types::{Activity, ActivityKind, Item, Status, StatusId, User, UserId, UserPatch};

use crate::config::EngineConfig;
use crate::diff::{Diagnostic, TimelineDiff, ViewDelta};
use crate::event::{Event, FocusRequest};
use crate::filter::{Admission, FilterPolicy};
use crate::focus::{clamp_focus, next_focus_index};
use crate::notify::Notified;
use crate::timeline::Timeline;

/// Which of the two views is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimelineKind {
    #[default]
    Home,
    Mention,
}

impl TimelineKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimelineKind::Home => "home",
            TimelineKind::Mention => "mention",
        }
    }
}

impl fmt::Display for TimelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The whole timeline state: a value, replaced as a unit by every
/// transition. Consumers read it through the accessors; nothing mutates a
/// pair that has already been handed out.
#[derive(Debug, Clone)]
pub struct TimelinePair {
    kind: TimelineKind,
    home: Timeline,
    mention: Timeline,
    user: Option<Arc<User>>,
    notified: Notified,
    rejected_ids: HashSet<UserId>,
    no_repost_ids: HashSet<UserId>,
    friend_ids: HashSet<UserId>,
    focus_index: Option<usize>,
    /// Positional index over mention activity rows, keyed by
    /// `(kind, target id)`. Kept separate from the display order so the
    /// merge path needs no linear scan of the mention view.
    activity_index: HashMap<(ActivityKind, StatusId), usize>,
}

impl Default for TimelinePair {
    fn default() -> Self {
        Self {
            kind: TimelineKind::Home,
            home: Timeline::gap_only(),
            mention: Timeline::gap_only(),
            user: None,
            notified: Notified::default(),
            rejected_ids: HashSet::new(),
            no_repost_ids: HashSet::new(),
            friend_ids: HashSet::new(),
            focus_index: None,
            activity_index: HashMap::new(),
        }
    }
}

impl TimelinePair {
    #[must_use]
    pub fn kind(&self) -> TimelineKind {
        self.kind
    }

    #[must_use]
    pub fn home(&self) -> &Timeline {
        &self.home
    }

    #[must_use]
    pub fn mention(&self) -> &Timeline {
        &self.mention
    }

    #[must_use]
    pub fn timeline(&self, kind: TimelineKind) -> &Timeline {
        match kind {
            TimelineKind::Home => &self.home,
            TimelineKind::Mention => &self.mention,
        }
    }

    #[must_use]
    pub fn active_timeline(&self) -> &Timeline {
        self.timeline(self.kind)
    }

    #[must_use]
    pub fn user(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn notified(&self) -> Notified {
        self.notified
    }

    #[must_use]
    pub fn focus_index(&self) -> Option<usize> {
        self.focus_index
    }

    #[must_use]
    pub fn rejected_ids(&self) -> &HashSet<UserId> {
        &self.rejected_ids
    }

    #[must_use]
    pub fn no_repost_ids(&self) -> &HashSet<UserId> {
        &self.no_repost_ids
    }

    #[must_use]
    pub fn friend_ids(&self) -> &HashSet<UserId> {
        &self.friend_ids
    }

    /// Whether the reject list catches `status`: its author, any mentioned
    /// account, its repost target's author, or its quoted status' author.
    /// The current user's own statuses are always exempt.
    pub(crate) fn is_muted_or_blocked(&self, status: &Status) -> bool {
        if let Some(user) = &self.user
            && status.user.id == user.id
        {
            return false;
        }
        if self.rejected_ids.contains(&status.user.id) {
            return true;
        }
        if status
            .mention_ids
            .iter()
            .any(|id| self.rejected_ids.contains(id))
        {
            return true;
        }
        if let Some(target) = &status.reposted_status
            && self.rejected_ids.contains(&target.user.id)
        {
            return true;
        }
        if let Some(quoted) = &status.quoted_status
            && self.rejected_ids.contains(&quoted.user.id)
        {
            return true;
        }
        false
    }

    pub(crate) fn is_no_repost(&self, status: &Status) -> bool {
        status.is_repost() && self.no_repost_ids.contains(&status.user.id)
    }

    fn rebuild_activity_index(&mut self) {
        self.activity_index = self
            .mention
            .items()
            .iter()
            .enumerate()
            .filter_map(|(pos, item)| {
                item.as_activity()
                    .map(|activity| ((activity.kind, activity.status.id), pos))
            })
            .collect();
    }

    fn shift_activity_index(&mut self, by: usize) {
        for pos in self.activity_index.values_mut() {
            *pos += by;
        }
    }

    /// Prepend a row to the mention view, keeping the activity index and
    /// the focus cursor (when mention is active) in step.
    fn prepend_mention(&mut self, item: Item, diff: &mut TimelineDiff) {
        self.shift_activity_index(1);
        if let Item::Activity(activity) = &item {
            self.activity_index
                .insert((activity.kind, activity.status.id), 0);
        }
        self.mention = self.mention.insert_front(item);
        diff.mention.inserted_at.push(0);
        if self.kind == TimelineKind::Mention {
            let moved = next_focus_index(self.focus_index, self.mention.len());
            if moved != self.focus_index {
                self.focus_index = moved;
                diff.focus_moved = true;
            }
        }
    }

    /// Fold an actor into the mention view's `(kind, target)` row,
    /// creating it at the front or moving the existing row there.
    fn merge_mention_activity(
        &mut self,
        kind: ActivityKind,
        target: Arc<Status>,
        by: Arc<User>,
        diff: &mut TimelineDiff,
    ) {
        let key = (kind, target.id);
        let Some(index) = self.activity_index.get(&key).copied() else {
            self.prepend_mention(Item::Activity(Activity::new(kind, target, by)), diff);
            return;
        };

        let existing = match self.mention.get(index) {
            Some(Item::Activity(activity)) => activity.clone(),
            _ => {
                tracing::warn!("activity index out of sync at {index}; rebuilding");
                self.rebuild_activity_index();
                self.merge_mention_activity(kind, target, by, diff);
                return;
            }
        };
        let updated = existing.merge(target, by);

        self.mention = self
            .mention
            .remove_at(index)
            .insert_front(Item::Activity(updated));
        for pos in self.activity_index.values_mut() {
            if *pos < index {
                *pos += 1;
            }
        }
        self.activity_index.insert(key, 0);
        diff.mention.updated = true;
        diff.mention.inserted_at.push(0);

        if self.kind == TimelineKind::Mention
            && self.focus_index.is_some_and(|focus| index > focus)
        {
            let moved = next_focus_index(self.focus_index, self.mention.len());
            if moved != self.focus_index {
                self.focus_index = moved;
                diff.focus_moved = true;
            }
        }
    }

    /// Tie the incoming status into any reply chain already on screen and
    /// return it with its links filled in. Also patches the rows that now
    /// relate to it. Home only; the mention view does not track chains.
    fn link_related(&mut self, status: &Arc<Status>) -> Arc<Status> {
        let main = status.main_status();
        let main_id = main.id;
        let in_reply_to = main.in_reply_to_status_id;

        let mut related = status.related_status_ids.clone();
        for item in self.home.items() {
            if let Item::Status(row) = item {
                if row.in_reply_to_status_id == Some(main_id) && !related.contains(&row.id) {
                    related.push(row.id);
                }
                if in_reply_to == Some(row.id) && !related.contains(&row.id) {
                    related.push(row.id);
                }
            }
        }

        let (home, _) = self.home.update_where(
            |item| {
                item.as_status().is_some_and(|row| {
                    let row_main = row.main_status();
                    Some(row_main.id) == in_reply_to
                        || row_main.in_reply_to_status_id == Some(main_id)
                })
            },
            |item| match item {
                Item::Status(row) => {
                    let mut ids = row.related_status_ids.clone();
                    if !ids.contains(&main_id) {
                        ids.push(main_id);
                    }
                    Item::Status(Arc::new(row.with_related(ids)))
                }
                other => other.clone(),
            },
        );
        self.home = home;

        if related == status.related_status_ids {
            Arc::clone(status)
        } else {
            Arc::new(status.with_related(related))
        }
    }

    /// Put an admitted status into the home view. A row already standing
    /// for the same logical status in the same form (plain, or repost of
    /// the same target) moves to the front instead of duplicating.
    fn put_in_home(&mut self, status: &Arc<Status>, diff: &mut TimelineDiff) {
        let status = self.link_related(status);
        let in_home = self.kind == TimelineKind::Home;

        let existing = if let Some(target) = &status.reposted_status {
            let target_id = target.id;
            self.home.position(|item| {
                item.as_status().is_some_and(|row| {
                    row.reposted_status
                        .as_ref()
                        .is_some_and(|t| t.id == target_id)
                })
            })
        } else {
            let own = status.id;
            self.home.position(|item| {
                item.as_status()
                    .is_some_and(|row| !row.is_repost() && row.id == own)
            })
        };

        match existing {
            Some(index) => {
                self.home = self
                    .home
                    .remove_at(index)
                    .insert_front(Item::Status(status));
                diff.home.updated = true;
                diff.home.inserted_at.push(0);
                if in_home && self.focus_index.is_some_and(|focus| focus < index) {
                    let moved = next_focus_index(self.focus_index, self.home.len());
                    if moved != self.focus_index {
                        self.focus_index = moved;
                        diff.focus_moved = true;
                    }
                }
            }
            None => {
                self.home = self.home.insert_front(Item::Status(status));
                diff.home.inserted_at.push(0);
                if in_home {
                    let moved = next_focus_index(self.focus_index, self.home.len());
                    if moved != self.focus_index {
                        self.focus_index = moved;
                        diff.focus_moved = true;
                    }
                }
            }
        }
    }

    /// Apply the length cap to both views and keep the cursor in range.
    fn enforce_bounds(&mut self, max: Option<usize>, diff: &mut TimelineDiff) {
        let Some(max) = max else { return };
        if self.home.len() > max {
            self.home = self.home.truncated(max);
        }
        if self.mention.len() > max {
            self.mention = self.mention.truncated(max);
            self.activity_index.retain(|_, pos| *pos < max);
        }
        let clamped = clamp_focus(self.focus_index, self.active_timeline().len());
        if clamped != self.focus_index {
            self.focus_index = clamped;
            diff.focus_moved = true;
        }
    }

    /// Mark views that received rows while inactive and report the badge
    /// edge, if this transition produced one.
    fn notify_for(&mut self, admitted: Admission, diff: &mut TimelineDiff) {
        let home = (admitted.home && self.kind != TimelineKind::Home) || self.notified.home;
        let mention =
            (admitted.mention && self.kind != TimelineKind::Mention) || self.notified.mention;
        let (notified, badge) = self.notified.transition(home, mention);
        self.notified = notified;
        if badge.is_some() {
            diff.badge = badge;
        }
    }
}

#[cfg(test)]
impl TimelinePair {
    pub(crate) fn with_user_for_tests(mut self, user: User) -> Self {
        self.user = Some(Arc::new(user));
        self
    }

    pub(crate) fn with_rejected_for_tests(
        mut self,
        ids: impl IntoIterator<Item = UserId>,
    ) -> Self {
        self.rejected_ids.extend(ids);
        self
    }

    pub(crate) fn with_no_repost_for_tests(
        mut self,
        ids: impl IntoIterator<Item = UserId>,
    ) -> Self {
        self.no_repost_ids.extend(ids);
        self
    }
}

fn status_matches(row: &Status, ids: &HashSet<UserId>) -> bool {
    ids.contains(&row.user.id)
        || row
            .reposted_status
            .as_ref()
            .is_some_and(|target| ids.contains(&target.user.id))
        || row.mention_ids.iter().any(|id| ids.contains(id))
}

/// The merge/update engine: folds one event at a time into a pair.
///
/// Single-threaded and synchronous by design. The engine holds only its
/// configuration and the injected filter policy; all feed state lives in
/// the [`TimelinePair`] values it consumes and produces.
#[derive(Debug, Default)]
pub struct Engine {
    config: EngineConfig,
    filter: FilterPolicy,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig, filter: FilterPolicy) -> Self {
        Self { config, filter }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply one event, producing the next pair and a change descriptor.
    ///
    /// Total: malformed or unmatched input degrades to a no-op carrying a
    /// diagnostic, never a fault. A diff with `changed == false` means
    /// the returned pair is interchangeable with the previous one.
    #[must_use]
    pub fn apply(&self, pair: &TimelinePair, event: Event) -> (TimelinePair, TimelineDiff) {
        match event {
            Event::NewStatus(status) => self.add_status(pair, status),
            Event::NewStatuses(statuses) => self.add_statuses(pair, statuses),
            Event::BackfillMentions(statuses) => self.add_mentions(pair, statuses),
            Event::Backfill { kind, index, items } => self.backfill(pair, kind, index, items),
            Event::DeleteStatus(id) => self.delete_status(pair, id),
            Event::RepostConfirmed(status)
            | Event::UnrepostConfirmed(status)
            | Event::LikeConfirmed(status)
            | Event::UnlikeConfirmed(status) => self.patch_status(pair, status),
            Event::Liked { status, by } => self.add_activity(pair, ActivityKind::Like, status, by),
            Event::Followed { status, by } => {
                self.add_activity(pair, ActivityKind::Follow, status, by)
            }
            Event::AddRejectedIds(ids) => self.add_rejected_ids(pair, ids),
            Event::RemoveRejectedIds(ids) => self.remove_rejected_ids(pair, ids),
            Event::AddNoRepostIds(ids) => self.add_no_repost_ids(pair, ids),
            Event::SetUser(user) => self.set_user(pair, user),
            Event::UpdateUser(patch) => self.update_user(pair, &patch),
            Event::AddFriends(ids) => self.add_friends(pair, ids),
            Event::RemoveFriends(ids) => self.remove_friends(pair, ids),
            Event::ResetFriends(ids) => self.reset_friends(pair, ids),
            Event::ConnectionLost => self.add_gap(pair),
            Event::SwitchTimeline(kind) => self.switch_timeline(pair, kind),
            Event::Focus(request) => self.focus(pair, request),
        }
    }

    fn add_status(&self, pair: &TimelinePair, status: Status) -> (TimelinePair, TimelineDiff) {
        if let Err(err) = status.validate() {
            tracing::warn!("rejected malformed status {}: {err}", status.id);
            return (
                pair.clone(),
                TimelineDiff::with_diagnostic(Diagnostic::MalformedStatus(err)),
            );
        }

        let admitted = self.filter.admit(&status, pair, self.config.mute);
        if admitted.is_none() {
            tracing::debug!("status {} rejected for both views", status.id);
            return (pair.clone(), TimelineDiff::unchanged());
        }

        let status = Arc::new(status);
        let mut next = pair.clone();
        let mut diff = TimelineDiff {
            changed: true,
            ..TimelineDiff::default()
        };

        if admitted.home {
            next.put_in_home(&status, &mut diff);
        }

        if admitted.mention {
            if let Some(target) = status.reposted_status.clone() {
                next.merge_mention_activity(
                    ActivityKind::Repost,
                    target,
                    Arc::clone(&status.user),
                    &mut diff,
                );
            } else {
                next.prepend_mention(Item::Status(Arc::clone(&status)), &mut diff);
            }
        }

        next.enforce_bounds(self.config.max_timeline_items, &mut diff);
        next.notify_for(admitted, &mut diff);
        (next, diff)
    }

    fn add_statuses(
        &self,
        pair: &TimelinePair,
        statuses: Vec<Status>,
    ) -> (TimelinePair, TimelineDiff) {
        let mut next = pair.clone();
        let mut combined = TimelineDiff::unchanged();
        for status in statuses {
            let (folded, diff) = self.add_status(&next, status);
            next = folded;
            combined.absorb(diff);
        }
        (next, combined)
    }

    /// A fetched mention backlog, prepended as a block (newest first),
    /// skipping statuses the view already shows.
    fn add_mentions(
        &self,
        pair: &TimelinePair,
        statuses: Vec<Status>,
    ) -> (TimelinePair, TimelineDiff) {
        let mut block: Vec<Item> = Vec::with_capacity(statuses.len());
        for status in statuses {
            if let Err(err) = status.validate() {
                tracing::warn!("dropping malformed mention {}: {err}", status.id);
                continue;
            }
            if pair.mention.contains_status(status.id) {
                continue;
            }
            block.push(Item::Status(Arc::new(status)));
        }
        if block.is_empty() {
            return (pair.clone(), TimelineDiff::unchanged());
        }

        let count = block.len();
        let mut next = pair.clone();
        let mut diff = TimelineDiff {
            changed: true,
            ..TimelineDiff::default()
        };

        next.shift_activity_index(count);
        next.mention = next.mention.insert_front_all(block);
        diff.mention.inserted_at.extend(0..count);
        if next.kind == TimelineKind::Mention
            && let Some(focus) = next.focus_index
        {
            next.focus_index = Some(focus + count);
            diff.focus_moved = true;
        }

        next.enforce_bounds(self.config.max_timeline_items, &mut diff);
        next.notify_for(
            Admission {
                home: false,
                mention: true,
            },
            &mut diff,
        );
        (next, diff)
    }

    /// Resolve a gap with a pagination response. Each fetched status runs
    /// through the per-view filter before insertion; admission routing is
    /// not re-derived because the fetch itself targeted one view.
    fn backfill(
        &self,
        pair: &TimelinePair,
        kind: TimelineKind,
        index: usize,
        items: Vec<Item>,
    ) -> (TimelinePair, TimelineDiff) {
        let mute = self.config.mute;
        let mut block: Vec<Item> = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Item::Status(row) => {
                    if let Err(err) = row.validate() {
                        tracing::warn!("dropping malformed backfill status {}: {err}", row.id);
                        continue;
                    }
                    let rejected = pair.is_muted_or_blocked(&row);
                    let keep = match kind {
                        TimelineKind::Home => {
                            !self.filter.rejects_home(&row, pair) && (!mute.home || !rejected)
                        }
                        TimelineKind::Mention => {
                            !self.filter.rejects_mention(&row, pair) && (!mute.mention || !rejected)
                        }
                    };
                    if keep {
                        block.push(Item::Status(row));
                    }
                }
                other => block.push(other),
            }
        }

        let Some(spliced) = pair.timeline(kind).replace_gap_with(index, block.clone()) else {
            tracing::debug!("backfill target at {kind}:{index} is not a gap");
            return (
                pair.clone(),
                TimelineDiff::with_diagnostic(Diagnostic::NotAGap { kind, index }),
            );
        };

        let mut next = pair.clone();
        let mut diff = TimelineDiff {
            changed: true,
            ..TimelineDiff::default()
        };
        for offset in 0..block.len() {
            diff.view_mut(kind).inserted_at.push(index + offset);
        }

        match kind {
            TimelineKind::Home => {
                next.home = spliced;
                // Freshly arrived history joins reply chains, oldest first.
                for item in block.iter().rev() {
                    if let Item::Status(row) = item {
                        let linked = next.link_related(row);
                        if !Arc::ptr_eq(&linked, row) {
                            let (home, _) = next.home.update_where(
                                |it| it.as_status().is_some_and(|r| r.id == row.id),
                                |_| Item::Status(Arc::clone(&linked)),
                            );
                            next.home = home;
                        }
                    }
                }
            }
            TimelineKind::Mention => {
                next.mention = spliced;
                next.rebuild_activity_index();
            }
        }

        next.enforce_bounds(self.config.max_timeline_items, &mut diff);
        (next, diff)
    }

    /// Remove every trace of a status: its own row, repost rows wrapping
    /// it, and activity rows targeting it. Absent is fine; deletions on a
    /// live stream routinely race local state.
    fn delete_status(&self, pair: &TimelinePair, id: StatusId) -> (TimelinePair, TimelineDiff) {
        let keep = |item: &Item| match item {
            Item::Status(row) => {
                row.id != id
                    && !row
                        .reposted_status
                        .as_ref()
                        .is_some_and(|target| target.id == id)
            }
            Item::Activity(activity) => activity.status.id != id,
            Item::Gap => true,
        };

        let home = pair.home.retain(keep);
        let mention = pair.mention.retain(keep);
        let home_removed = home.len() != pair.home.len();
        let mention_removed = mention.len() != pair.mention.len();
        if !home_removed && !mention_removed {
            return (pair.clone(), TimelineDiff::unchanged());
        }

        tracing::debug!("deleted status {id} from timelines");
        let mut next = pair.clone();
        let mut diff = TimelineDiff {
            changed: true,
            ..TimelineDiff::default()
        };
        if home_removed {
            next.home = home;
            diff.home.removed_ids.push(id);
        }
        if mention_removed {
            next.mention = mention;
            next.rebuild_activity_index();
            diff.mention.removed_ids.push(id);
        }

        let clamped = clamp_focus(next.focus_index, next.active_timeline().len());
        if clamped != next.focus_index {
            next.focus_index = clamped;
            diff.focus_moved = true;
        }
        (next, diff)
    }

    /// Patch a confirmed write (repost/unrepost/like/unlike) into every
    /// occurrence of the logical status. Never re-runs admission: an
    /// already-visible row stays visible.
    fn patch_status(&self, pair: &TimelinePair, status: Status) -> (TimelinePair, TimelineDiff) {
        if let Err(err) = status.validate() {
            tracing::warn!("rejected malformed status {}: {err}", status.id);
            return (
                pair.clone(),
                TimelineDiff::with_diagnostic(Diagnostic::MalformedStatus(err)),
            );
        }

        let status = Arc::new(status);
        let patch = status
            .reposted_status
            .clone()
            .unwrap_or_else(|| Arc::clone(&status));
        let id = patch.id;

        let pred = |item: &Item| match item {
            Item::Status(row) => row.main_status_id() == id,
            Item::Activity(activity) => activity.status.id == id,
            Item::Gap => false,
        };
        let update = |item: &Item| match item {
            Item::Status(row) if row.is_repost() => {
                Item::Status(Arc::new(row.with_repost_target(Arc::clone(&patch))))
            }
            Item::Status(_) => Item::Status(Arc::clone(&patch)),
            Item::Activity(activity) => Item::Activity(Activity {
                kind: activity.kind,
                status: Arc::clone(&patch),
                by: activity.by.clone(),
            }),
            Item::Gap => Item::Gap,
        };

        let (home, home_changed) = pair.home.update_where(&pred, &update);
        let (mention, mention_changed) = pair.mention.update_where(&pred, &update);
        if !home_changed && !mention_changed {
            tracing::debug!("no row for status {id}; leaving state unchanged");
            return (pair.clone(), TimelineDiff::unchanged());
        }

        let mut next = pair.clone();
        let mut diff = TimelineDiff {
            changed: true,
            ..TimelineDiff::default()
        };
        if home_changed {
            next.home = home;
            diff.home.updated = true;
        }
        if mention_changed {
            next.mention = mention;
            diff.mention.updated = true;
        }
        (next, diff)
    }

    /// Someone else acted on one of our statuses: patch the status rows,
    /// then fold the actor into the mention view's aggregated row.
    fn add_activity(
        &self,
        pair: &TimelinePair,
        kind: ActivityKind,
        status: Status,
        by: User,
    ) -> (TimelinePair, TimelineDiff) {
        if let Err(err) = status.validate() {
            tracing::warn!("rejected malformed status {}: {err}", status.id);
            return (
                pair.clone(),
                TimelineDiff::with_diagnostic(Diagnostic::MalformedStatus(err)),
            );
        }
        let Some(user) = pair.user() else {
            tracing::warn!("{} activity before current user is set", kind.as_str());
            return (
                pair.clone(),
                TimelineDiff::with_diagnostic(Diagnostic::UserNotSet),
            );
        };
        if by.id == user.id {
            // Our own actions surface through the confirmation path.
            return (pair.clone(), TimelineDiff::unchanged());
        }

        let (mut next, mut diff) = self.patch_status(pair, status.clone());
        diff.changed = true;
        next.merge_mention_activity(kind, Arc::new(status), Arc::new(by), &mut diff);
        next.enforce_bounds(self.config.max_timeline_items, &mut diff);
        next.notify_for(
            Admission {
                home: false,
                mention: true,
            },
            &mut diff,
        );
        (next, diff)
    }

    /// Grow the reject list and purge matching rows from both views.
    /// Purging is lossy: removing an id later does not bring rows back.
    fn add_rejected_ids(
        &self,
        pair: &TimelinePair,
        ids: Vec<UserId>,
    ) -> (TimelinePair, TimelineDiff) {
        let added: HashSet<UserId> = ids
            .into_iter()
            .filter(|id| !pair.rejected_ids.contains(id))
            .collect();
        if added.is_empty() {
            return (pair.clone(), TimelineDiff::unchanged());
        }

        let mut next = pair.clone();
        next.rejected_ids.extend(added.iter().copied());
        let mut diff = TimelineDiff {
            changed: true,
            ..TimelineDiff::default()
        };

        let mut home_items = Vec::with_capacity(pair.home.len());
        let mut home_delta = ViewDelta::default();
        for item in pair.home.items() {
            match item {
                Item::Status(row) if status_matches(row, &added) => {
                    home_delta.removed_ids.push(row.main_status_id());
                }
                other => home_items.push(other.clone()),
            }
        }
        if !home_delta.removed_ids.is_empty() {
            next.home = Timeline::from_items(home_items);
            diff.home = home_delta;
        }

        let mut mention_items = Vec::with_capacity(pair.mention.len());
        let mut mention_delta = ViewDelta::default();
        for item in pair.mention.items() {
            match item {
                Item::Status(row) if status_matches(row, &added) => {
                    mention_delta.removed_ids.push(row.main_status_id());
                }
                Item::Activity(activity) => match activity.without_actors(&added) {
                    None => mention_delta.removed_ids.push(activity.status.id),
                    Some(kept) => {
                        if kept.by.len() != activity.by.len() {
                            mention_delta.updated = true;
                        }
                        mention_items.push(Item::Activity(kept));
                    }
                },
                other => mention_items.push(other.clone()),
            }
        }
        if !mention_delta.is_empty() {
            next.mention = Timeline::from_items(mention_items);
            next.rebuild_activity_index();
            diff.mention = mention_delta;
        }

        let clamped = clamp_focus(next.focus_index, next.active_timeline().len());
        if clamped != next.focus_index {
            next.focus_index = clamped;
            diff.focus_moved = true;
        }
        (next, diff)
    }

    fn remove_rejected_ids(
        &self,
        pair: &TimelinePair,
        ids: Vec<UserId>,
    ) -> (TimelinePair, TimelineDiff) {
        let removing: HashSet<UserId> = ids
            .into_iter()
            .filter(|id| pair.rejected_ids.contains(id))
            .collect();
        if removing.is_empty() {
            return (pair.clone(), TimelineDiff::unchanged());
        }

        // Rows purged while these ids were rejected are gone for good.
        let mut next = pair.clone();
        next.rejected_ids.retain(|id| !removing.contains(id));
        (
            next,
            TimelineDiff {
                changed: true,
                ..TimelineDiff::default()
            },
        )
    }

    /// Block future reposts by these authors and purge their existing
    /// repost rows from home. The mention view holds no repost rows.
    fn add_no_repost_ids(
        &self,
        pair: &TimelinePair,
        ids: Vec<UserId>,
    ) -> (TimelinePair, TimelineDiff) {
        let added: HashSet<UserId> = ids
            .into_iter()
            .filter(|id| !pair.no_repost_ids.contains(id))
            .collect();
        if added.is_empty() {
            return (pair.clone(), TimelineDiff::unchanged());
        }

        let mut next = pair.clone();
        next.no_repost_ids.extend(added.iter().copied());
        let mut diff = TimelineDiff {
            changed: true,
            ..TimelineDiff::default()
        };

        let mut home_items = Vec::with_capacity(pair.home.len());
        let mut home_delta = ViewDelta::default();
        for item in pair.home.items() {
            match item {
                Item::Status(row) if row.is_repost() && added.contains(&row.user.id) => {
                    home_delta.removed_ids.push(row.main_status_id());
                }
                other => home_items.push(other.clone()),
            }
        }
        if !home_delta.removed_ids.is_empty() {
            next.home = Timeline::from_items(home_items);
            diff.home = home_delta;
            let clamped = clamp_focus(next.focus_index, next.active_timeline().len());
            if clamped != next.focus_index {
                next.focus_index = clamped;
                diff.focus_moved = true;
            }
        }
        (next, diff)
    }

    fn set_user(&self, pair: &TimelinePair, user: User) -> (TimelinePair, TimelineDiff) {
        let mut next = pair.clone();
        next.user = Some(Arc::new(user));
        (
            next,
            TimelineDiff {
                changed: true,
                ..TimelineDiff::default()
            },
        )
    }

    fn update_user(&self, pair: &TimelinePair, patch: &UserPatch) -> (TimelinePair, TimelineDiff) {
        let Some(user) = pair.user() else {
            tracing::warn!("profile update before current user is set");
            return (
                pair.clone(),
                TimelineDiff::with_diagnostic(Diagnostic::UserNotSet),
            );
        };
        let mut next = pair.clone();
        next.user = Some(Arc::new(user.apply(patch)));
        (
            next,
            TimelineDiff {
                changed: true,
                ..TimelineDiff::default()
            },
        )
    }

    fn add_friends(&self, pair: &TimelinePair, ids: Vec<UserId>) -> (TimelinePair, TimelineDiff) {
        let added: Vec<UserId> = ids
            .into_iter()
            .filter(|id| !pair.friend_ids.contains(id))
            .collect();
        if added.is_empty() {
            return (pair.clone(), TimelineDiff::unchanged());
        }
        let mut next = pair.clone();
        next.friend_ids.extend(added);
        (
            next,
            TimelineDiff {
                changed: true,
                ..TimelineDiff::default()
            },
        )
    }

    fn remove_friends(
        &self,
        pair: &TimelinePair,
        ids: Vec<UserId>,
    ) -> (TimelinePair, TimelineDiff) {
        let removing: HashSet<UserId> = ids
            .into_iter()
            .filter(|id| pair.friend_ids.contains(id))
            .collect();
        if removing.is_empty() {
            return (pair.clone(), TimelineDiff::unchanged());
        }
        let mut next = pair.clone();
        next.friend_ids.retain(|id| !removing.contains(id));
        (
            next,
            TimelineDiff {
                changed: true,
                ..TimelineDiff::default()
            },
        )
    }

    fn reset_friends(&self, pair: &TimelinePair, ids: Vec<UserId>) -> (TimelinePair, TimelineDiff) {
        let replacement: HashSet<UserId> = ids.into_iter().collect();
        if replacement == pair.friend_ids {
            return (pair.clone(), TimelineDiff::unchanged());
        }
        let mut next = pair.clone();
        next.friend_ids = replacement;
        (
            next,
            TimelineDiff {
                changed: true,
                ..TimelineDiff::default()
            },
        )
    }

    /// Mark a stream discontinuity. A view whose head is already a gap is
    /// left alone; two adjacent gaps mean nothing more than one.
    fn add_gap(&self, pair: &TimelinePair) -> (TimelinePair, TimelineDiff) {
        let home_needs = !pair.home.first_is_gap();
        let mention_needs = !pair.mention.first_is_gap();
        if !home_needs && !mention_needs {
            return (pair.clone(), TimelineDiff::unchanged());
        }

        let mut next = pair.clone();
        let mut diff = TimelineDiff {
            changed: true,
            ..TimelineDiff::default()
        };
        if home_needs {
            next.home = next.home.insert_front(Item::Gap);
            diff.home.inserted_at.push(0);
        }
        if mention_needs {
            next.shift_activity_index(1);
            next.mention = next.mention.insert_front(Item::Gap);
            diff.mention.inserted_at.push(0);
        }

        let active_changed = match next.kind {
            TimelineKind::Home => home_needs,
            TimelineKind::Mention => mention_needs,
        };
        if active_changed {
            let moved = next_focus_index(next.focus_index, next.active_timeline().len());
            if moved != next.focus_index {
                next.focus_index = moved;
                diff.focus_moved = true;
            }
        }
        next.enforce_bounds(self.config.max_timeline_items, &mut diff);
        (next, diff)
    }

    fn switch_timeline(
        &self,
        pair: &TimelinePair,
        kind: TimelineKind,
    ) -> (TimelinePair, TimelineDiff) {
        if kind == pair.kind {
            return (pair.clone(), TimelineDiff::unchanged());
        }
        let mut next = pair.clone();
        let (notified, badge) = pair.notified.transition(
            if kind == TimelineKind::Home {
                false
            } else {
                pair.notified.home
            },
            if kind == TimelineKind::Mention {
                false
            } else {
                pair.notified.mention
            },
        );
        next.kind = kind;
        next.notified = notified;
        let focus_moved = next.focus_index.is_some();
        next.focus_index = None;
        (
            next,
            TimelineDiff {
                changed: true,
                focus_moved,
                badge,
                ..TimelineDiff::default()
            },
        )
    }

    /// Pure index arithmetic over the active view. Out-of-range requests
    /// are rejected with the state unchanged and no diagnostic; rapid
    /// key-repeat at a boundary is routine.
    fn focus(&self, pair: &TimelinePair, request: FocusRequest) -> (TimelinePair, TimelineDiff) {
        let len = pair.active_timeline().len();
        let current = pair.focus_index;
        let target = match request {
            FocusRequest::Next => match current {
                None => Some(0),
                Some(index) => Some(index + 1),
            },
            FocusRequest::Prev => match current {
                None | Some(0) => return (pair.clone(), TimelineDiff::unchanged()),
                Some(index) => Some(index - 1),
            },
            FocusRequest::Top => Some(0),
            FocusRequest::Bottom => {
                if len == 0 {
                    return (pair.clone(), TimelineDiff::unchanged());
                }
                Some(len - 1)
            }
            FocusRequest::On(index) => Some(index),
            FocusRequest::Clear => None,
        };

        if let Some(index) = target
            && index >= len
        {
            return (pair.clone(), TimelineDiff::unchanged());
        }
        if target == current {
            return (pair.clone(), TimelineDiff::unchanged());
        }

        let mut next = pair.clone();
        next.focus_index = target;
        (
            next,
            TimelineDiff {
                changed: true,
                focus_moved: true,
                ..TimelineDiff::default()
            },
        )
    }
}
