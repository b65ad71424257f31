use std::fmt;

use roost_types::Status;

use crate::config::MuteConfig;
use crate::state::TimelinePair;

/// Injected veto predicate: `true` rejects the status for that view.
/// Supplied by an external extension mechanism; the engine calls it and
/// owns no knowledge of its implementation.
pub type VetoPredicate = Box<dyn Fn(&Status, &TimelinePair) -> bool + Send + Sync>;

/// Where an incoming status may go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Admission {
    pub home: bool,
    pub mention: bool,
}

impl Admission {
    #[must_use]
    pub fn is_none(self) -> bool {
        !self.home && !self.mention
    }
}

/// Pluggable admission policy consulted before any row enters a view.
#[derive(Default)]
pub struct FilterPolicy {
    home_vetoes: Vec<VetoPredicate>,
    mention_vetoes: Vec<VetoPredicate>,
}

impl fmt::Debug for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPolicy")
            .field("home_vetoes", &self.home_vetoes.len())
            .field("mention_vetoes", &self.mention_vetoes.len())
            .finish()
    }
}

impl FilterPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_home_veto(
        &mut self,
        veto: impl Fn(&Status, &TimelinePair) -> bool + Send + Sync + 'static,
    ) {
        self.home_vetoes.push(Box::new(veto));
    }

    pub fn add_mention_veto(
        &mut self,
        veto: impl Fn(&Status, &TimelinePair) -> bool + Send + Sync + 'static,
    ) {
        self.mention_vetoes.push(Box::new(veto));
    }

    pub(crate) fn rejects_home(&self, status: &Status, pair: &TimelinePair) -> bool {
        self.home_vetoes.iter().any(|veto| veto(status, pair))
    }

    pub(crate) fn rejects_mention(&self, status: &Status, pair: &TimelinePair) -> bool {
        self.mention_vetoes.iter().any(|veto| veto(status, pair))
    }

    /// Decide which views admit `status`. Deterministic: a pure function
    /// of the status, the pair, and the mute configuration.
    #[must_use]
    pub fn admit(&self, status: &Status, pair: &TimelinePair, mute: MuteConfig) -> Admission {
        let muted_or_blocked = pair.is_muted_or_blocked(status);

        let home = !self.rejects_home(status, pair)
            && (!mute.home || !muted_or_blocked)
            && !pair.is_no_repost(status);

        let mention = match pair.user() {
            Some(user) => {
                let mentions_user = status.mentions_user(user.id)
                    || status
                        .reposted_status
                        .as_ref()
                        .is_some_and(|target| target.user.id == user.id);
                mentions_user
                    && status.user.id != user.id
                    && !self.rejects_mention(status, pair)
                    && (!mute.mention || !muted_or_blocked)
            }
            None => false,
        };

        Admission { home, mention }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use roost_types::{StatusId, User, UserId};

    use super::*;

    fn user(id: u64) -> User {
        User {
            id: UserId::new(id),
            screen_name: format!("user{id}"),
            name: format!("User {id}"),
            protected: false,
        }
    }

    fn status(id: u64, author: u64) -> Status {
        Status {
            id: StatusId::new(id),
            user: Arc::new(user(author)),
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
        }
    }

    fn pair_with_user(id: u64) -> TimelinePair {
        TimelinePair::default().with_user_for_tests(user(id))
    }

    #[test]
    fn plain_status_goes_home_only() {
        let policy = FilterPolicy::new();
        let pair = pair_with_user(1);
        let admit = policy.admit(&status(10, 2), &pair, MuteConfig::default());
        assert!(admit.home);
        assert!(!admit.mention);
    }

    #[test]
    fn mention_of_current_user_goes_to_both() {
        let policy = FilterPolicy::new();
        let pair = pair_with_user(1);
        let mut incoming = status(10, 2);
        incoming.mention_ids.push(UserId::new(1));

        let admit = policy.admit(&incoming, &pair, MuteConfig::default());
        assert!(admit.home);
        assert!(admit.mention);
    }

    #[test]
    fn self_authored_mention_stays_out_of_mention_view() {
        let policy = FilterPolicy::new();
        let pair = pair_with_user(1);
        let mut own = status(10, 1);
        own.mention_ids.push(UserId::new(1));

        let admit = policy.admit(&own, &pair, MuteConfig::default());
        assert!(admit.home);
        assert!(!admit.mention);
    }

    #[test]
    fn repost_of_current_users_status_counts_as_mention() {
        let policy = FilterPolicy::new();
        let pair = pair_with_user(1);
        let mut wrapper = status(11, 2);
        wrapper.reposted_status = Some(Arc::new(status(10, 1)));

        let admit = policy.admit(&wrapper, &pair, MuteConfig::default());
        assert!(admit.mention);
    }

    #[test]
    fn rejected_author_is_muted_when_configured() {
        let policy = FilterPolicy::new();
        let pair = pair_with_user(1).with_rejected_for_tests([UserId::new(2)]);
        let incoming = status(10, 2);

        let admit = policy.admit(&incoming, &pair, MuteConfig::default());
        assert!(!admit.home);

        // Mute disabled for home: the reject list no longer applies there.
        let relaxed = MuteConfig {
            home: false,
            mention: true,
        };
        let admit = policy.admit(&incoming, &pair, relaxed);
        assert!(admit.home);
    }

    #[test]
    fn rejected_mentioned_or_quoted_user_also_mutes() {
        let policy = FilterPolicy::new();
        let pair = pair_with_user(1).with_rejected_for_tests([UserId::new(9)]);

        let mut mentions_rejected = status(10, 2);
        mentions_rejected.mention_ids.push(UserId::new(9));
        assert!(!policy.admit(&mentions_rejected, &pair, MuteConfig::default()).home);

        let mut quotes_rejected = status(11, 2);
        quotes_rejected.quoted_status = Some(Arc::new(status(5, 9)));
        assert!(!policy.admit(&quotes_rejected, &pair, MuteConfig::default()).home);
    }

    #[test]
    fn current_user_is_exempt_from_reject_check() {
        let policy = FilterPolicy::new();
        let pair = pair_with_user(1).with_rejected_for_tests([UserId::new(1)]);
        let own = status(10, 1);
        assert!(policy.admit(&own, &pair, MuteConfig::default()).home);
    }

    #[test]
    fn no_repost_author_is_blocked_regardless_of_mute() {
        let policy = FilterPolicy::new();
        let pair = pair_with_user(1).with_no_repost_for_tests([UserId::new(2)]);
        let mut wrapper = status(11, 2);
        wrapper.reposted_status = Some(Arc::new(status(10, 3)));

        let relaxed = MuteConfig {
            home: false,
            mention: false,
        };
        assert!(!policy.admit(&wrapper, &pair, relaxed).home);
        // The same author's plain statuses are unaffected.
        assert!(policy.admit(&status(12, 2), &pair, relaxed).home);
    }

    #[test]
    fn injected_veto_overrides_everything_else() {
        let mut policy = FilterPolicy::new();
        policy.add_home_veto(|status, _| status.text.contains("spam"));
        let pair = pair_with_user(1);

        let mut spam = status(10, 2);
        spam.text = "buy spam now".to_string();
        assert!(!policy.admit(&spam, &pair, MuteConfig::default()).home);
        assert!(policy.admit(&status(11, 2), &pair, MuteConfig::default()).home);
    }

    #[test]
    fn no_user_means_no_mention_admission() {
        let policy = FilterPolicy::new();
        let pair = TimelinePair::default();
        let mut incoming = status(10, 2);
        incoming.mention_ids.push(UserId::new(1));
        assert!(!policy.admit(&incoming, &pair, MuteConfig::default()).mention);
    }
}
