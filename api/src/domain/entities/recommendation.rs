//! Recommendation value
//!
//! Transient output of the matchmaker. Produced fresh on every call and
//! never persisted.

use serde::Serialize;

use super::player::PlayerId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub player_ids: Vec<PlayerId>,
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
    /// Absolute rating-sum difference between the teams, rounded to 2 decimals
    pub balance_diff: f64,
    pub partner_repeat_penalty: u32,
    /// Human-readable diagnostics
    pub reasons: Vec<String>,
}
