//! Player domain entity
//!
//! Represents a member of a group's rotating pool, with the counters the
//! matchmaker uses to decide who rests and who plays next.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::GroupId;

/// Lowest rating a player can hold
pub const MIN_RATING: f64 = 0.0;

/// Highest rating a player can hold
pub const MAX_RATING: f64 = 8.0;

/// Unique identifier for a player
///
/// Ordering follows the canonical hyphenated string form, which is what
/// matchup keys and rest-priority tie-breaks compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PlayerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player in a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub group_id: GroupId,
    pub name: String,
    /// Skill rating within [MIN_RATING, MAX_RATING]
    pub rating: f64,
    pub is_present: bool,
    /// Rounds rested consecutively while present
    pub games_since_played: u32,
    pub games_played: u32,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Presence toggle: arriving (or re-arriving) clears the rest counter.
    pub fn set_present(&mut self, is_present: bool) {
        if is_present {
            self.games_since_played = 0;
        }
        self.is_present = is_present;
    }

    /// Counter update after a completed match this player took part in.
    pub fn record_played(&mut self, new_rating: f64) {
        self.rating = new_rating;
        self.games_played += 1;
        self.games_since_played = 0;
    }

    /// Counter update after a completed match this present player sat out.
    pub fn record_sat_out(&mut self) {
        self.games_since_played += 1;
    }
}

/// Data needed to add a player to a group
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub group_id: GroupId,
    pub name: String,
    pub rating: f64,
}

/// Partial update of a player's profile
#[derive(Debug, Clone, Default)]
pub struct PlayerChanges {
    pub name: Option<String>,
    pub rating: Option<f64>,
}

/// Presence change for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    pub player_id: PlayerId,
    pub is_present: bool,
}

/// Check whether a rating lies inside the allowed range
pub fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating)
}
