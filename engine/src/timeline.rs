use roost_types::{Item, StatusId};

/// An insertion-ordered sequence of rows, newest first.
///
/// A value type: every operation returns a new sequence and leaves the
/// receiver untouched. Rows are `Arc`-backed, so clones share storage and
/// previously returned snapshots stay immutable no matter what later
/// transitions do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    items: Vec<Item>,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The session-start shape: a single gap standing for all history.
    #[must_use]
    pub fn gap_only() -> Self {
        Self {
            items: vec![Item::Gap],
        }
    }

    pub(crate) fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    #[must_use]
    pub fn first_is_gap(&self) -> bool {
        matches!(self.items.first(), Some(Item::Gap))
    }

    /// Whether a row with this own id (not main-status id) is present.
    #[must_use]
    pub(crate) fn contains_status(&self, id: StatusId) -> bool {
        self.items
            .iter()
            .any(|item| item.as_status().is_some_and(|row| row.id == id))
    }

    /// Position of the first row matching `pred`.
    #[must_use]
    pub(crate) fn position(&self, pred: impl Fn(&Item) -> bool) -> Option<usize> {
        self.items.iter().position(pred)
    }

    /// Prepend one row. Bound enforcement is separate; see [`truncated`].
    ///
    /// [`truncated`]: Timeline::truncated
    #[must_use]
    pub(crate) fn insert_front(&self, item: Item) -> Timeline {
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.push(item);
        items.extend(self.items.iter().cloned());
        Timeline { items }
    }

    /// Prepend a block, preserving its internal order.
    #[must_use]
    pub(crate) fn insert_front_all(&self, block: Vec<Item>) -> Timeline {
        let mut items = Vec::with_capacity(self.items.len() + block.len());
        items.extend(block);
        items.extend(self.items.iter().cloned());
        Timeline { items }
    }

    /// Drop rows beyond `max`, oldest first. Not an error; the bound is a
    /// memory cap, not a contract with the reader.
    #[must_use]
    pub(crate) fn truncated(&self, max: usize) -> Timeline {
        if self.items.len() <= max {
            return self.clone();
        }
        Timeline {
            items: self.items[..max].to_vec(),
        }
    }

    /// Remove the row at `index`; out-of-range is a no-op.
    #[must_use]
    pub(crate) fn remove_at(&self, index: usize) -> Timeline {
        if index >= self.items.len() {
            return self.clone();
        }
        let mut items = self.items.clone();
        items.remove(index);
        Timeline { items }
    }

    /// Apply `update` to every row matching `pred` without reordering.
    /// A status can match at most twice: once as itself and once inside
    /// a repost row. Returns whether anything matched.
    #[must_use]
    pub(crate) fn update_where(
        &self,
        pred: impl Fn(&Item) -> bool,
        update: impl Fn(&Item) -> Item,
    ) -> (Timeline, bool) {
        let mut changed = false;
        let items = self
            .items
            .iter()
            .map(|item| {
                if pred(item) {
                    changed = true;
                    update(item)
                } else {
                    item.clone()
                }
            })
            .collect();
        (Timeline { items }, changed)
    }

    /// Keep rows matching `pred`. Removal is lossy by design; nothing
    /// remembers the dropped rows.
    #[must_use]
    pub(crate) fn retain(&self, pred: impl Fn(&Item) -> bool) -> Timeline {
        Timeline {
            items: self
                .items
                .iter()
                .filter(|item| pred(item))
                .cloned()
                .collect(),
        }
    }

    /// Splice `block` in place of the gap at `index`, preserving the
    /// block's order. `None` when the row at `index` is not a gap.
    #[must_use]
    pub(crate) fn replace_gap_with(&self, index: usize, block: Vec<Item>) -> Option<Timeline> {
        if !matches!(self.items.get(index), Some(Item::Gap)) {
            return None;
        }
        let mut items = Vec::with_capacity(self.items.len() + block.len());
        items.extend(self.items[..index].iter().cloned());
        items.extend(block);
        items.extend(self.items[index + 1..].iter().cloned());
        Some(Timeline { items })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use roost_types::{Status, User, UserId};

    use super::*;

    fn status(id: u64) -> Item {
        Item::Status(Arc::new(Status {
            id: StatusId::new(id),
            user: Arc::new(User {
                id: UserId::new(1),
                screen_name: "user1".to_string(),
                name: "User 1".to_string(),
                protected: false,
            }),
            text: String::new(),
            in_reply_to_status_id: None,
            mention_ids: Vec::new(),
            reposted_status: None,
            quoted_status: None,
            reposted: false,
            liked: false,
            repost_count: 0,
            like_count: 0,
            related_status_ids: Vec::new(),
        }))
    }

    fn ids(timeline: &Timeline) -> Vec<u64> {
        timeline
            .items()
            .iter()
            .filter_map(|item| item.as_status().map(|row| row.id.value()))
            .collect()
    }

    #[test]
    fn insert_front_prepends_newest() {
        let timeline = Timeline::new().insert_front(status(1)).insert_front(status(2));
        assert_eq!(ids(&timeline), vec![2, 1]);
    }

    #[test]
    fn truncated_drops_oldest_silently() {
        let timeline = Timeline::from_items(vec![status(3), status(2), status(1)]);
        assert_eq!(ids(&timeline.truncated(2)), vec![3, 2]);
        assert_eq!(timeline.truncated(5), timeline);
    }

    #[test]
    fn replace_gap_splices_in_order() {
        let timeline = Timeline::from_items(vec![status(5), Item::Gap, status(1)]);
        let filled = timeline
            .replace_gap_with(1, vec![status(4), status(3), status(2)])
            .unwrap();
        assert_eq!(ids(&filled), vec![5, 4, 3, 2, 1]);
        assert!(!filled.items().iter().any(Item::is_gap));
    }

    #[test]
    fn replace_gap_rejects_non_gap_position() {
        let timeline = Timeline::from_items(vec![status(2), Item::Gap]);
        assert!(timeline.replace_gap_with(0, vec![status(9)]).is_none());
        assert!(timeline.replace_gap_with(7, vec![status(9)]).is_none());
    }

    #[test]
    fn update_where_patches_without_reordering() {
        let timeline = Timeline::from_items(vec![status(3), status(2), status(1)]);
        let (updated, changed) = timeline.update_where(
            |item| item.as_status().is_some_and(|row| row.id.value() == 2),
            |_| status(20),
        );
        assert!(changed);
        assert_eq!(ids(&updated), vec![3, 20, 1]);

        let (same, changed) = timeline.update_where(|_| false, |item| item.clone());
        assert!(!changed);
        assert_eq!(same, timeline);
    }

    #[test]
    fn original_snapshot_survives_later_operations() {
        let before = Timeline::from_items(vec![status(1)]);
        let after = before.insert_front(status(2)).retain(|_| false);
        assert_eq!(ids(&before), vec![1]);
        assert!(after.is_empty());
    }
}
