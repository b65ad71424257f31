use std::sync::Arc;

use roost_types::{Item, Status, User, UserId};

use crate::event::FocusRequest;

/// An overlay timeline opened on top of the pair: a user's history or a
/// reply chain. It carries its own focus cursor and never touches the
/// pair's notified/badge state. Closing it is dropping the value.
#[derive(Debug, Clone, PartialEq)]
pub enum SlaveTimeline {
    User {
        user: Arc<User>,
        items: Vec<Item>,
        focus: Option<usize>,
    },
    Conversation {
        items: Vec<Item>,
        focus: Option<usize>,
    },
}

impl SlaveTimeline {
    #[must_use]
    pub fn open_user(user: User) -> Self {
        SlaveTimeline::User {
            user: Arc::new(user),
            items: Vec::new(),
            focus: None,
        }
    }

    /// A conversation is opened with its statuses already resolved,
    /// root first.
    #[must_use]
    pub fn open_conversation(statuses: Vec<Status>) -> Self {
        SlaveTimeline::Conversation {
            items: statuses
                .into_iter()
                .map(|status| Item::Status(Arc::new(status)))
                .collect(),
            focus: None,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        match self {
            SlaveTimeline::User { items, .. } | SlaveTimeline::Conversation { items, .. } => items,
        }
    }

    #[must_use]
    pub fn focus(&self) -> Option<usize> {
        match self {
            SlaveTimeline::User { focus, .. } | SlaveTimeline::Conversation { focus, .. } => *focus,
        }
    }

    /// Fresh statuses for a user timeline, prepended newest first. A
    /// conversation, or a user timeline for a different account, is left
    /// unchanged.
    #[must_use]
    pub fn add_statuses(&self, user_id: UserId, statuses: Vec<Status>) -> SlaveTimeline {
        let SlaveTimeline::User { user, items, focus } = self else {
            return self.clone();
        };
        if user.id != user_id || statuses.is_empty() {
            return self.clone();
        }

        let count = statuses.len();
        let mut next = Vec::with_capacity(items.len() + count);
        next.extend(
            statuses
                .into_iter()
                .map(|status| Item::Status(Arc::new(status))),
        );
        next.extend(items.iter().cloned());
        SlaveTimeline::User {
            user: Arc::clone(user),
            items: next,
            focus: focus.map(|index| index + count),
        }
    }

    /// Older history appended at the tail (pagination). The cursor keeps
    /// its position; nothing above it moved.
    #[must_use]
    pub fn append_past_items(&self, user_id: UserId, past: Vec<Item>) -> SlaveTimeline {
        let SlaveTimeline::User { user, items, focus } = self else {
            return self.clone();
        };
        if user.id != user_id || past.is_empty() {
            return self.clone();
        }

        let mut next = items.clone();
        next.extend(past);
        SlaveTimeline::User {
            user: Arc::clone(user),
            items: next,
            focus: *focus,
        }
    }

    /// Same arithmetic and rejection rules as the pair's focus cursor.
    #[must_use]
    pub fn apply_focus(&self, request: FocusRequest) -> SlaveTimeline {
        let len = self.items().len();
        let current = self.focus();
        let target = match request {
            FocusRequest::Next => match current {
                None => Some(0),
                Some(index) => Some(index + 1),
            },
            FocusRequest::Prev => match current {
                None | Some(0) => return self.clone(),
                Some(index) => Some(index - 1),
            },
            FocusRequest::Top => Some(0),
            FocusRequest::Bottom => {
                if len == 0 {
                    return self.clone();
                }
                Some(len - 1)
            }
            FocusRequest::On(index) => Some(index),
            FocusRequest::Clear => None,
        };
        if let Some(index) = target
            && index >= len
        {
            return self.clone();
        }
        self.with_focus(target)
    }

    /// Drop the cursor without closing the overlay.
    #[must_use]
    pub fn blur(&self) -> SlaveTimeline {
        self.with_focus(None)
    }

    fn with_focus(&self, focus: Option<usize>) -> SlaveTimeline {
        match self {
            SlaveTimeline::User { user, items, .. } => SlaveTimeline::User {
                user: Arc::clone(user),
                items: items.clone(),
                focus,
            },
            SlaveTimeline::Conversation { items, .. } => SlaveTimeline::Conversation {
                items: items.clone(),
                focus,
            },
        }
    }
}
