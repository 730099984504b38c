//! Commit-time checks on client-submitted matchups
//!
//! Only the hard no-repeat rule is re-checked here. Sit and play caps are a
//! recommendation concern, so a client racing a concurrent change is not
//! rejected for them.

use std::collections::HashSet;

use super::keys::{is_repeated_in_window, order_by_recency, MatchupKey, RecentMatch};
use super::tuning::{CANDIDATE_POOL_SIZE, HARD_NO_REPEAT_WINDOW, PLAYERS_PER_MATCH};
use crate::domain::entities::{Player, PlayerId};
use crate::error::SubmissionError;

/// A 2v2 matchup as submitted by a client, already shape-checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedMatchup {
    pub player_ids: [PlayerId; 4],
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
}

impl SubmittedMatchup {
    /// Check that `player_ids` are four distinct players and the teams split them 2+2
    pub fn new(
        player_ids: &[PlayerId],
        team_a: &[PlayerId],
        team_b: &[PlayerId],
    ) -> Result<Self, SubmissionError> {
        let players: HashSet<PlayerId> = player_ids.iter().copied().collect();
        if player_ids.len() != PLAYERS_PER_MATCH || players.len() != PLAYERS_PER_MATCH {
            return Err(SubmissionError::InvalidShape(
                "playerIds must include exactly 4 unique players".to_string(),
            ));
        }

        let (Ok(team_a), Ok(team_b)) = (
            <[PlayerId; 2]>::try_from(team_a),
            <[PlayerId; 2]>::try_from(team_b),
        ) else {
            return Err(SubmissionError::InvalidShape(
                "Each team must have exactly 2 players".to_string(),
            ));
        };

        let on_teams: HashSet<PlayerId> = team_a.iter().chain(team_b.iter()).copied().collect();
        if on_teams.len() != PLAYERS_PER_MATCH {
            return Err(SubmissionError::InvalidShape(
                "Teams must contain 4 unique players".to_string(),
            ));
        }
        if on_teams != players {
            return Err(SubmissionError::InvalidShape(
                "Teams must be a split of playerIds".to_string(),
            ));
        }

        Ok(Self {
            player_ids: [player_ids[0], player_ids[1], player_ids[2], player_ids[3]],
            team_a,
            team_b,
        })
    }

    pub fn matchup_key(&self) -> MatchupKey {
        MatchupKey::new(&self.team_a, &self.team_b)
    }
}

/// Reject a submission that repeats one of the last few matchups.
///
/// Applies only when exactly six players are present; any other count
/// passes. `recent` may be in any order.
pub fn validate_six_player_submission(
    present: &[Player],
    recent: &[RecentMatch],
    submitted: &SubmittedMatchup,
) -> Result<(), SubmissionError> {
    if present.len() != CANDIDATE_POOL_SIZE {
        return Ok(());
    }

    check_repeat_window(recent, submitted)
}

/// The hard no-repeat rule on its own, for callers outside six-player mode
pub fn check_repeat_window(
    recent: &[RecentMatch],
    submitted: &SubmittedMatchup,
) -> Result<(), SubmissionError> {
    let ordered = order_by_recency(recent);
    if is_repeated_in_window(&submitted.matchup_key(), &ordered, HARD_NO_REPEAT_WINDOW) {
        return Err(SubmissionError::MatchupRepeated {
            window: HARD_NO_REPEAT_WINDOW,
        });
    }
    Ok(())
}
