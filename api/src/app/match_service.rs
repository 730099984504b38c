//! Match service
//!
//! Orchestrates recommend, submit and edit for a group. Every write that
//! depends on a read (present players, recent history) runs under the
//! group's lock so at most one submission or edit is in flight per group.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::app::matchmaker_debug::MatchmakerDebug;
use crate::domain::entities::{
    GroupId, Match, MatchId, NewMatch, Player, PlayerId, RatingMap, Recommendation, ScoreEdit,
    MAX_SCORE,
};
use crate::domain::matchmaking::tuning::{
    CANDIDATE_POOL_SIZE, GROUP_MATCH_LIST_LIMIT, PAIRING_HISTORY_WINDOW, PLAYERS_PER_MATCH,
    RECENT_MATCH_FETCH_LIMIT,
};
use crate::domain::matchmaking::{
    check_repeat_window, order_by_recency, recommend, validate_six_player_submission,
    RecentMatch, SubmittedMatchup,
};
use crate::domain::ports::{MatchRepository, PlayerRepository};
use crate::domain::rating::{build_edit_adjustments, calculate_doubles_update};
use crate::error::{AppError, DomainError, MatchmakingError, RatingError, SubmissionError};

/// Per-group async locks, created on first use
#[derive(Default)]
pub struct GroupLocks {
    locks: Mutex<HashMap<GroupId, Arc<tokio::sync::Mutex<()>>>>,
}

impl GroupLocks {
    pub fn lock_for(&self, group_id: &GroupId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(*group_id).or_default().clone()
    }
}

/// A completed match as reported by an editor
#[derive(Debug, Clone)]
pub struct SubmittedMatch {
    pub player_ids: Vec<PlayerId>,
    pub team_a: Vec<PlayerId>,
    pub team_b: Vec<PlayerId>,
    pub score_a: i64,
    pub score_b: i64,
}

/// Result of an accepted submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    #[serde(rename = "match")]
    pub recorded: Match,
    pub next_recommendation: Option<Recommendation>,
}

fn validate_score(score: i64) -> Result<u8, AppError> {
    u8::try_from(score)
        .ok()
        .filter(|s| *s <= MAX_SCORE)
        .ok_or_else(|| {
            AppError::BadRequest(format!("Scores must be between 0 and {}", MAX_SCORE))
        })
}

/// Service for match recommendation, submission and score edits
pub struct MatchService<PR, MR>
where
    PR: PlayerRepository,
    MR: MatchRepository,
{
    players: Arc<PR>,
    matches: Arc<MR>,
    locks: GroupLocks,
    debug: MatchmakerDebug,
}

impl<PR, MR> MatchService<PR, MR>
where
    PR: PlayerRepository,
    MR: MatchRepository,
{
    pub fn new(players: Arc<PR>, matches: Arc<MR>, debug: MatchmakerDebug) -> Self {
        Self {
            players,
            matches,
            locks: GroupLocks::default(),
            debug,
        }
    }

    async fn recent_matches(&self, group_id: &GroupId) -> Result<Vec<RecentMatch>, AppError> {
        let matches = self.matches.list(group_id, RECENT_MATCH_FETCH_LIMIT).await?;
        Ok(matches.iter().map(RecentMatch::from).collect())
    }

    /// Most recent matches of a group, newest first
    pub async fn history(&self, group_id: &GroupId) -> Result<Vec<Match>, AppError> {
        Ok(self.matches.list(group_id, GROUP_MATCH_LIST_LIMIT).await?)
    }

    /// Recommend the next match from the group's present players and recent history
    pub async fn recommend(&self, group_id: &GroupId) -> Result<Recommendation, AppError> {
        let present = self.players.list_present(group_id).await?;
        if present.len() < PLAYERS_PER_MATCH {
            return Err(MatchmakingError::InsufficientPresentPlayers {
                present: present.len(),
            }
            .into());
        }

        let recent = order_by_recency(&self.recent_matches(group_id).await?);
        let recommendation = recommend(&present, &recent)?;

        self.debug
            .recommend(group_id, &present, &recent, &recommendation);
        tracing::debug!(
            group_id = %group_id,
            present = present.len(),
            balance_diff = recommendation.balance_diff,
            "Recommendation computed"
        );

        Ok(recommendation)
    }

    /// Record a completed match, rate it, and compute the next recommendation
    pub async fn submit_score(
        &self,
        group_id: &GroupId,
        submitted: SubmittedMatch,
    ) -> Result<SubmitOutcome, AppError> {
        let matchup =
            SubmittedMatchup::new(&submitted.player_ids, &submitted.team_a, &submitted.team_b)?;
        let score_a = validate_score(submitted.score_a)?;
        let score_b = validate_score(submitted.score_b)?;

        let lock = self.locks.lock_for(group_id);
        let _guard = lock.lock().await;

        let present = self.players.list_present(group_id).await?;
        let recent = self.recent_matches(group_id).await?;

        if present.len() == CANDIDATE_POOL_SIZE {
            validate_six_player_submission(&present, &recent, &matchup)?;
        } else if present.len() >= PLAYERS_PER_MATCH {
            check_repeat_window(&recent, &matchup)?;
        }

        let pre_match_ratings = participant_ratings(&present, &matchup.player_ids)?;
        let update = calculate_doubles_update(
            &pre_match_ratings,
            &matchup.team_a,
            &matchup.team_b,
            score_a,
            score_b,
        )?;

        let recorded = self
            .matches
            .record(&NewMatch {
                group_id: *group_id,
                players: matchup.player_ids,
                team_a: matchup.team_a,
                team_b: matchup.team_b,
                score_a,
                score_b,
                rating_deltas: update.deltas_by_id,
                pre_match_ratings,
                new_ratings: update.new_ratings_by_id,
            })
            .await?;

        tracing::info!(
            group_id = %group_id,
            match_id = %recorded.id,
            score_a = score_a,
            score_b = score_b,
            expected_a = update.diagnostics.team_expected_a,
            team_delta_a = update.diagnostics.team_total_delta_a,
            "Match recorded"
        );

        let (next_recommendation, post_submit_present) =
            self.next_recommendation(group_id, &recorded, &recent).await;
        self.debug.submit_saved(
            &recorded,
            next_recommendation.as_ref(),
            &post_submit_present,
        );

        Ok(SubmitOutcome {
            recorded,
            next_recommendation,
        })
    }

    /// Recommendation after a successful submission. Never fails: the match
    /// is already stored, so any problem here only means "no suggestion".
    async fn next_recommendation(
        &self,
        group_id: &GroupId,
        recorded: &Match,
        pre_submit_recent: &[RecentMatch],
    ) -> (Option<Recommendation>, Vec<Player>) {
        let present = match self.players.list_present(group_id).await {
            Ok(present) => present,
            Err(e) => {
                tracing::warn!(group_id = %group_id, error = %e, "Could not reload players after submit");
                return (None, Vec::new());
            }
        };
        if present.len() < PLAYERS_PER_MATCH {
            return (None, present);
        }

        let merged = merge_recent(RecentMatch::from(recorded), pre_submit_recent);
        match recommend(&present, &merged) {
            Ok(recommendation) => (Some(recommendation), present),
            Err(e) => {
                tracing::warn!(group_id = %group_id, error = %e, "No recommendation after submit");
                (None, present)
            }
        }
    }

    /// Change the score of a recorded match and correct the affected ratings
    pub async fn edit_score(
        &self,
        group_id: &GroupId,
        match_id: &MatchId,
        score_a: i64,
        score_b: i64,
    ) -> Result<Match, AppError> {
        let score_a = validate_score(score_a)?;
        let score_b = validate_score(score_b)?;

        let lock = self.locks.lock_for(group_id);
        let _guard = lock.lock().await;

        let current = self
            .matches
            .find_by_id(group_id, match_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Match not found: {}", match_id)))?;

        if !current.pre_match_ratings.contains_all(&current.players) {
            return Err(RatingError::MissingRatingSnapshot(current.id).into());
        }

        let update = calculate_doubles_update(
            &current.pre_match_ratings,
            &current.team_a,
            &current.team_b,
            score_a,
            score_b,
        )?;
        let adjustments =
            build_edit_adjustments(&current.players, &current.rating_deltas, &update.deltas_by_id);

        let edited = self
            .matches
            .apply_score_edit(&ScoreEdit {
                group_id: *group_id,
                match_id: current.id,
                score_a,
                score_b,
                rating_deltas: update.deltas_by_id,
                adjustments,
            })
            .await?;

        tracing::info!(
            group_id = %group_id,
            match_id = %match_id,
            score_a = score_a,
            score_b = score_b,
            "Match score edited"
        );

        Ok(edited)
    }
}

/// Pre-match ratings of the participants, all of whom must be present
fn participant_ratings(
    present: &[Player],
    participants: &[PlayerId; 4],
) -> Result<RatingMap, SubmissionError> {
    participants
        .iter()
        .map(|id| {
            present
                .iter()
                .find(|p| p.id == *id)
                .map(|p| (*id, p.rating))
                .ok_or(SubmissionError::SubmittedPlayersNotPresent)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|ratings| ratings.into_iter().collect())
}

/// Newest-first history with the just-recorded match, de-duplicated by id
fn merge_recent(recorded: RecentMatch, earlier: &[RecentMatch]) -> Vec<RecentMatch> {
    let mut seen = HashSet::new();
    let merged: Vec<RecentMatch> = std::iter::once(recorded)
        .chain(earlier.iter().copied())
        .filter(|m| m.id.map_or(true, |id| seen.insert(id)))
        .collect();

    let mut ordered = order_by_recency(&merged);
    ordered.truncate(PAIRING_HISTORY_WINDOW);
    ordered
}
