//! Matchmaking configuration constants
//!
//! Window sizes and scoring weights used by the recommender, the six-player
//! rotation engine, and submission validation.

/// Trailing number of matches within which an exact matchup may not recur
pub const HARD_NO_REPEAT_WINDOW: usize = 6;

/// Number of most recent matches consulted for partner/exact-team penalties
pub const PAIRING_HISTORY_WINDOW: usize = 12;

/// Maximum number of present players considered for the next match
pub const CANDIDATE_POOL_SIZE: usize = 6;

/// Players on court per match
pub const PLAYERS_PER_MATCH: usize = 4;

/// Span of rounds (history plus the proposed one) the sit/play caps cover
pub const SIT_WINDOW_SIZE: usize = 5;

/// Clean historical rounds looked back over when projecting the sit window
pub const SIT_LOOKBACK: usize = SIT_WINDOW_SIZE - 1;

/// A player may sit at most this many rounds inside the sit window
pub const MAX_SITS_IN_WINDOW: u32 = 2;

/// A player must sit at least this many rounds inside the sit window
pub const MIN_SITS_IN_WINDOW: u32 = 1;

/// General recommender weight on accumulated rest
pub const SIT_SCORE_WEIGHT: f64 = 5.0;

/// General recommender weight on team imbalance
pub const BALANCE_WEIGHT: f64 = 1.5;

/// General recommender weight on games already played
pub const PLAY_PENALTY_WEIGHT: f64 = 1.0;

/// General recommender weight on repeated partnerships
pub const PARTNER_REPEAT_WEIGHT: f64 = 3.0;

/// Team splitter weight on repeated partnerships
pub const SPLIT_PARTNER_REPEAT_WEIGHT: f64 = 1.25;

/// Team splitter weight on repeated exact matchups
pub const SPLIT_EXACT_REPEAT_WEIGHT: f64 = 2.0;

/// Number of matches the orchestrator fetches as recent history
pub const RECENT_MATCH_FETCH_LIMIT: u64 = PAIRING_HISTORY_WINDOW as u64;

/// Number of matches shown in a group overview
pub const GROUP_MATCH_LIST_LIMIT: u64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_fit_inside_fetched_history() {
        assert!(HARD_NO_REPEAT_WINDOW <= PAIRING_HISTORY_WINDOW);
        assert!(SIT_LOOKBACK <= PAIRING_HISTORY_WINDOW);
        assert_eq!(RECENT_MATCH_FETCH_LIMIT, 12);
    }

    #[test]
    fn overview_lists_more_than_recent_history() {
        assert_eq!(GROUP_MATCH_LIST_LIMIT, 1000);
        assert!(GROUP_MATCH_LIST_LIMIT >= RECENT_MATCH_FETCH_LIMIT);
    }

    #[test]
    fn sit_lookback_is_one_less_than_window() {
        assert_eq!(SIT_WINDOW_SIZE, 5);
        assert_eq!(SIT_LOOKBACK, 4);
    }

    #[test]
    fn sit_caps_are_satisfiable_with_six_players() {
        // Two of six sit every round, so the average sits per window is 5 * 2 / 6.
        let average = (SIT_WINDOW_SIZE as f64) * 2.0 / (CANDIDATE_POOL_SIZE as f64);
        assert!(average >= MIN_SITS_IN_WINDOW as f64);
        assert!(average <= MAX_SITS_IN_WINDOW as f64);
    }

    #[test]
    fn hard_window_is_six() {
        assert_eq!(HARD_NO_REPEAT_WINDOW, 6);
    }
}
