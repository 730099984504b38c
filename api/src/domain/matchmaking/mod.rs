//! Matchmaking
//!
//! Pure, synchronous selection of the next doubles match:
//! - `candidates`: rest-priority ordering and the candidate pool
//! - `team_split`: best 2v2 split of four players
//! - `general`: brute-force recommender for any present count except six
//! - `rotation`: strict six-player rotation
//! - `validation`: commit-time re-check of submitted matchups
//!
//! Nothing here touches storage or the clock; history and players are inputs.

pub mod candidates;
pub mod general;
pub mod keys;
pub mod rotation;
pub mod team_split;
pub mod tuning;
pub mod validation;

pub use keys::{order_by_recency, MatchupKey, RecentMatch};
pub use validation::{check_repeat_window, validate_six_player_submission, SubmittedMatchup};

use crate::domain::entities::{Player, Recommendation};
use crate::error::MatchmakingError;

use candidates::candidate_pool;
use tuning::{CANDIDATE_POOL_SIZE, PLAYERS_PER_MATCH};

/// Round to 2 decimals for display
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Recommend the next match for the present players.
///
/// `recent` may arrive in any order; it is sorted newest-first before use.
/// Six present players switch to the strict rotation, every other count uses
/// the general recommender over the rest-priority pool.
pub fn recommend(
    present: &[Player],
    recent: &[RecentMatch],
) -> Result<Recommendation, MatchmakingError> {
    if present.len() < PLAYERS_PER_MATCH {
        return Err(MatchmakingError::InsufficientPresentPlayers {
            present: present.len(),
        });
    }

    let pool = candidate_pool(present);
    let ordered = order_by_recency(recent);

    if present.len() == CANDIDATE_POOL_SIZE && pool.len() == CANDIDATE_POOL_SIZE {
        rotation::recommend_six_player(&pool, &ordered)
    } else {
        general::recommend_general(&pool, &ordered)
    }
}
