//! General recommender
//!
//! Brute-force search over every 4-player subset of the candidate pool.
//! Used whenever the strict six-player rotation does not apply.

use super::candidates::four_subsets;
use super::keys::RecentMatch;
use super::round2;
use super::team_split::{best_team_split, TeamOption};
use super::tuning::{
    BALANCE_WEIGHT, PARTNER_REPEAT_WEIGHT, PLAYERS_PER_MATCH, PLAY_PENALTY_WEIGHT,
    SIT_SCORE_WEIGHT,
};
use crate::domain::entities::{Player, PlayerId, Recommendation};
use crate::error::MatchmakingError;

struct ScoredSet {
    player_ids: Vec<PlayerId>,
    teams: TeamOption,
    sit_score: u32,
    play_penalty: u32,
    total: f64,
}

/// Recommend a match from a rest-priority ordered pool and newest-first history.
///
/// Subsets are visited in lexicographic index order over the pool and the
/// first subset reaching the highest total wins ties.
pub fn recommend_general(
    pool: &[&Player],
    recent: &[RecentMatch],
) -> Result<Recommendation, MatchmakingError> {
    if pool.len() < PLAYERS_PER_MATCH {
        return Err(MatchmakingError::InsufficientPresentPlayers {
            present: pool.len(),
        });
    }

    let max_sit = pool.iter().map(|p| p.games_since_played).max().unwrap_or(0);
    let must_include: Vec<PlayerId> = if max_sit > 0 {
        pool.iter()
            .filter(|p| p.games_since_played == max_sit)
            .map(|p| p.id)
            .collect()
    } else {
        Vec::new()
    };
    let enforce_must_include = must_include.len() <= PLAYERS_PER_MATCH;

    let mut best: Option<ScoredSet> = None;

    for indices in four_subsets(pool.len()) {
        let players = indices.map(|i| pool[i]);
        let player_ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();

        if enforce_must_include && !must_include.iter().all(|id| player_ids.contains(id)) {
            continue;
        }

        let teams = best_team_split(players, recent);
        let sit_score: u32 = players.iter().map(|p| p.games_since_played).sum();
        let play_penalty: u32 = players.iter().map(|p| p.games_played).sum();
        let total = sit_score as f64 * SIT_SCORE_WEIGHT
            - teams.balance_diff * BALANCE_WEIGHT
            - play_penalty as f64 * PLAY_PENALTY_WEIGHT
            - teams.partner_repeat_penalty as f64 * PARTNER_REPEAT_WEIGHT;

        if best.as_ref().map_or(true, |b| total > b.total) {
            best = Some(ScoredSet {
                player_ids,
                teams,
                sit_score,
                play_penalty,
                total,
            });
        }
    }

    let best = best.ok_or(MatchmakingError::NoCandidateSet)?;
    let balance_diff = round2(best.teams.balance_diff);

    Ok(Recommendation {
        player_ids: best.player_ids,
        team_a: best.teams.team_a,
        team_b: best.teams.team_b,
        balance_diff,
        partner_repeat_penalty: best.teams.partner_repeat_penalty,
        reasons: vec![
            format!("Sat priority score: {}", best.sit_score),
            format!("Games played penalty: {}", best.play_penalty),
            format!("Balance difference: {}", balance_diff),
            format!(
                "Partner repeat penalty: {} (lower is better)",
                best.teams.partner_repeat_penalty
            ),
        ],
    })
}
