//! Matchup keys and history ordering
//!
//! A matchup key identifies a 2v2 pairing independent of which team is
//! labelled A or B and of the order inside each team. It is the only
//! equality test used for "same matchup" decisions.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{Match, MatchId, PlayerId};

/// Canonical, team-order-independent identifier for a 2v2 matchup
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MatchupKey(String);

impl MatchupKey {
    pub fn new(team_a: &[PlayerId; 2], team_b: &[PlayerId; 2]) -> Self {
        let left = pair_key(&team_a[0], &team_a[1]);
        let right = pair_key(&team_b[0], &team_b[1]);
        if left <= right {
            Self(format!("{}|{}", left, right))
        } else {
            Self(format!("{}|{}", right, left))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MatchupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// String key of an unordered pair, e.g. `"x:y"` with `x <= y`
pub fn pair_key(a: &PlayerId, b: &PlayerId) -> String {
    let (low, high) = ordered_pair(*a, *b);
    format!("{}:{}", low, high)
}

/// Unordered pair as an ordered tuple, for use as a map key
pub fn ordered_pair(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// The four cross-team opponent pairs of a matchup
pub fn opponent_pairs(team_a: &[PlayerId; 2], team_b: &[PlayerId; 2]) -> [(PlayerId, PlayerId); 4] {
    [
        ordered_pair(team_a[0], team_b[0]),
        ordered_pair(team_a[0], team_b[1]),
        ordered_pair(team_a[1], team_b[0]),
        ordered_pair(team_a[1], team_b[1]),
    ]
}

/// The slice of a match that matchmaking needs: who played with whom, and when
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentMatch {
    pub id: Option<MatchId>,
    pub created_at: Option<DateTime<Utc>>,
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
}

impl RecentMatch {
    /// A history entry without recency metadata; input order is kept for these
    pub fn new(team_a: [PlayerId; 2], team_b: [PlayerId; 2]) -> Self {
        Self {
            id: None,
            created_at: None,
            team_a,
            team_b,
        }
    }

    pub fn with_recency(mut self, id: MatchId, created_at: DateTime<Utc>) -> Self {
        self.id = Some(id);
        self.created_at = Some(created_at);
        self
    }

    pub fn matchup_key(&self) -> MatchupKey {
        MatchupKey::new(&self.team_a, &self.team_b)
    }

    pub fn participants(&self) -> [PlayerId; 4] {
        [self.team_a[0], self.team_a[1], self.team_b[0], self.team_b[1]]
    }

    /// Participants if the match has exactly four distinct players
    pub fn distinct_participants(&self) -> Option<HashSet<PlayerId>> {
        let set: HashSet<PlayerId> = self.participants().into_iter().collect();
        (set.len() == 4).then_some(set)
    }
}

impl From<&Match> for RecentMatch {
    fn from(m: &Match) -> Self {
        RecentMatch::new(m.team_a, m.team_b).with_recency(m.id, m.created_at)
    }
}

/// Newest-first ordering by creation time, id descending as the tiebreak.
///
/// Entries with a timestamp come before entries without one; entries without
/// timestamps compare equal, so a stable sort keeps their input order.
pub fn recency_order(a: &RecentMatch, b: &RecentMatch) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(at), Some(bt)) => bt.cmp(&at).then_with(|| b.id.cmp(&a.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Copy of `matches` sorted newest-first
pub fn order_by_recency(matches: &[RecentMatch]) -> Vec<RecentMatch> {
    let mut ordered = matches.to_vec();
    ordered.sort_by(recency_order);
    ordered
}

/// Whether `key` matches any of the first `window` entries of newest-first history
pub fn is_repeated_in_window(key: &MatchupKey, ordered: &[RecentMatch], window: usize) -> bool {
    ordered
        .iter()
        .take(window)
        .any(|m| &m.matchup_key() == key)
}
