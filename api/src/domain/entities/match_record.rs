//! Match domain entity
//!
//! A completed 2v2 doubles match. The pre-match rating snapshot is written
//! once at creation and is what makes later score edits safe.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::GroupId;
use super::player::PlayerId;
use crate::domain::rating::RatingAdjustment;

/// Highest score a team can record
pub const MAX_SCORE: u8 = 99;

/// Unique identifier for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for MatchId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed mapping from player to rating value (or rating delta).
///
/// Deserialization accepts numbers and numeric strings and silently drops
/// anything non-numeric or non-finite, so stored JSON never reaches the
/// rating engine in a malformed state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<PlayerId, serde_json::Value>")]
pub struct RatingMap(BTreeMap<PlayerId, f64>);

impl RatingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, ignoring non-finite numbers
    pub fn insert(&mut self, player_id: PlayerId, value: f64) {
        if value.is_finite() {
            self.0.insert(player_id, value);
        }
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<f64> {
        self.0.get(player_id).copied()
    }

    pub fn contains_all(&self, player_ids: &[PlayerId]) -> bool {
        player_ids.iter().all(|id| self.0.contains_key(id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &f64)> {
        self.0.iter()
    }

    /// Sum of all values (used for the zero-sum check on deltas)
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Parse a stored JSON column, falling back to an empty map
    pub fn from_json(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }
}

impl From<BTreeMap<PlayerId, serde_json::Value>> for RatingMap {
    fn from(raw: BTreeMap<PlayerId, serde_json::Value>) -> Self {
        let mut map = RatingMap::new();
        for (player_id, value) in raw {
            let numeric = match value {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            if let Some(v) = numeric {
                map.insert(player_id, v);
            }
        }
        map
    }
}

impl FromIterator<(PlayerId, f64)> for RatingMap {
    fn from_iter<I: IntoIterator<Item = (PlayerId, f64)>>(iter: I) -> Self {
        let mut map = RatingMap::new();
        for (player_id, value) in iter {
            map.insert(player_id, value);
        }
        map
    }
}

/// A recorded doubles match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: MatchId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub players: [PlayerId; 4],
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
    pub score_a: u8,
    pub score_b: u8,
    pub rating_deltas: RatingMap,
    /// Ratings of the four participants immediately before this match
    pub pre_match_ratings: RatingMap,
}

/// Everything persisted atomically when a submitted match is accepted
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub group_id: GroupId,
    pub players: [PlayerId; 4],
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
    pub score_a: u8,
    pub score_b: u8,
    pub rating_deltas: RatingMap,
    pub pre_match_ratings: RatingMap,
    /// Post-match ratings for the four participants
    pub new_ratings: RatingMap,
}

/// Everything persisted atomically when a match score is edited
#[derive(Debug, Clone)]
pub struct ScoreEdit {
    pub group_id: GroupId,
    pub match_id: MatchId,
    pub score_a: u8,
    pub score_b: u8,
    pub rating_deltas: RatingMap,
    /// Incremental corrections applied to each player's current rating
    pub adjustments: Vec<RatingAdjustment>,
}
