//! Six-player rotation engine
//!
//! Strict variant of the recommender used when exactly six players are
//! present. Previous sitters are forced back on court, exact matchups may
//! not recur inside the hard window, and once enough clean history exists
//! nobody sits more than 2 or fewer than 1 of any 5 consecutive rounds.
//!
//! A "clean" round is a historical match whose four participants all
//! belong to the current six-player roster.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::candidates::four_subsets;
use super::keys::{is_repeated_in_window, opponent_pairs, ordered_pair, MatchupKey, RecentMatch};
use super::round2;
use super::team_split::team_options;
use super::tuning::{
    CANDIDATE_POOL_SIZE, HARD_NO_REPEAT_WINDOW, MAX_SITS_IN_WINDOW, MIN_SITS_IN_WINDOW,
    SIT_LOOKBACK, SIT_WINDOW_SIZE,
};
use crate::domain::entities::{Player, PlayerId, Recommendation};
use crate::error::MatchmakingError;

type Pair = (PlayerId, PlayerId);

#[derive(Debug, Clone)]
struct Proposal {
    player_ids: Vec<PlayerId>,
    team_a: [PlayerId; 2],
    team_b: [PlayerId; 2],
    sit_score: u32,
    play_penalty: u32,
    balance_diff: f64,
    partner_repeat_penalty: u32,
    partner_usage_max: u32,
    opponent_repeat_penalty: u32,
    opponent_usage_max: u32,
    play_count_spread_after: u32,
    sit_window_max_after: u32,
    sit_window_min_after: u32,
    sit_window_total_after: u32,
    violates_sit_cap: bool,
    violates_play_cap: bool,
    violates_repeat_window: bool,
    matchup_key: MatchupKey,
}

impl Proposal {
    fn is_admissible(&self) -> bool {
        !self.violates_repeat_window && !self.violates_sit_cap && !self.violates_play_cap
    }
}

/// Partner and opponent pair usage over the supplied history
#[derive(Debug, Default)]
struct PairUsage {
    partners: HashMap<Pair, u32>,
    opponents: HashMap<Pair, u32>,
}

impl PairUsage {
    fn from_history(recent: &[RecentMatch]) -> Self {
        let mut usage = PairUsage::default();
        for m in recent {
            *usage
                .partners
                .entry(ordered_pair(m.team_a[0], m.team_a[1]))
                .or_default() += 1;
            *usage
                .partners
                .entry(ordered_pair(m.team_b[0], m.team_b[1]))
                .or_default() += 1;
            for pair in opponent_pairs(&m.team_a, &m.team_b) {
                *usage.opponents.entry(pair).or_default() += 1;
            }
        }
        usage
    }

    fn partner(&self, a: PlayerId, b: PlayerId) -> u32 {
        self.partners.get(&ordered_pair(a, b)).copied().unwrap_or(0)
    }

    fn opponent(&self, pair: &Pair) -> u32 {
        self.opponents.get(pair).copied().unwrap_or(0)
    }
}

/// Rounds sat per roster member over the most recent clean rounds
#[derive(Debug)]
struct SitWindow {
    counts: HashMap<PlayerId, u32>,
    rounds: usize,
}

impl SitWindow {
    fn from_history(roster: &[PlayerId], recent: &[RecentMatch], lookback: usize) -> Self {
        let mut counts: HashMap<PlayerId, u32> = roster.iter().map(|id| (*id, 0)).collect();
        let clean_rounds = recent
            .iter()
            .filter_map(|m| clean_round_participants(roster, m))
            .take(lookback);

        let mut rounds = 0;
        for playing in clean_rounds {
            rounds += 1;
            for id in roster.iter().filter(|id| !playing.contains(id)) {
                *counts.entry(*id).or_default() += 1;
            }
        }

        SitWindow { counts, rounds }
    }

    /// (max, min, total) sits per roster member once `playing` is played
    fn project(&self, roster: &[PlayerId], playing: &HashSet<PlayerId>) -> (u32, u32, u32) {
        let after: Vec<u32> = roster
            .iter()
            .map(|id| {
                let sat = self.counts.get(id).copied().unwrap_or(0);
                sat + u32::from(!playing.contains(id))
            })
            .collect();

        let max = after.iter().copied().max().unwrap_or(0);
        let min = after.iter().copied().min().unwrap_or(0);
        (max, min, after.iter().sum())
    }
}

/// Participants of `m` if it is a clean round for this roster
fn clean_round_participants(roster: &[PlayerId], m: &RecentMatch) -> Option<HashSet<PlayerId>> {
    m.distinct_participants()
        .filter(|played| played.iter().all(|id| roster.contains(id)))
}

/// Roster members who sat out the latest clean round.
///
/// Empty when no clean round exists in history.
pub fn last_round_sitters(roster: &[PlayerId], recent: &[RecentMatch]) -> Vec<PlayerId> {
    if roster.len() != CANDIDATE_POOL_SIZE {
        return Vec::new();
    }

    recent
        .iter()
        .find_map(|m| clean_round_participants(roster, m))
        .map(|played| {
            roster
                .iter()
                .filter(|id| !played.contains(id))
                .copied()
                .collect()
        })
        .unwrap_or_default()
}

fn build_proposals(
    pool: &[&Player],
    roster: &[PlayerId],
    must_play: &[PlayerId],
    recent: &[RecentMatch],
) -> Vec<Proposal> {
    let usage = PairUsage::from_history(recent);
    let sit_window = SitWindow::from_history(roster, recent, SIT_LOOKBACK);
    let enforce_caps = sit_window.rounds >= SIT_LOOKBACK;

    let mut proposals = Vec::new();

    for indices in four_subsets(pool.len()) {
        let players = indices.map(|i| pool[i]);
        let player_ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
        if !must_play.iter().all(|id| player_ids.contains(id)) {
            continue;
        }

        let playing: HashSet<PlayerId> = player_ids.iter().copied().collect();
        let sit_score: u32 = players.iter().map(|p| p.games_since_played).sum();
        let play_penalty: u32 = players.iter().map(|p| p.games_played).sum();
        let play_count_spread_after = games_played_spread_after(pool, &playing);
        let (sit_max, sit_min, sit_total) = sit_window.project(roster, &playing);

        for option in team_options(players, recent) {
            let partner_a = usage.partner(option.team_a[0], option.team_a[1]);
            let partner_b = usage.partner(option.team_b[0], option.team_b[1]);
            let opponent_counts =
                opponent_pairs(&option.team_a, &option.team_b).map(|pair| usage.opponent(&pair));

            proposals.push(Proposal {
                player_ids: player_ids.clone(),
                team_a: option.team_a,
                team_b: option.team_b,
                sit_score,
                play_penalty,
                balance_diff: option.balance_diff,
                partner_repeat_penalty: partner_a + partner_b,
                partner_usage_max: partner_a.max(partner_b),
                opponent_repeat_penalty: opponent_counts.iter().sum(),
                opponent_usage_max: opponent_counts.iter().copied().max().unwrap_or(0),
                play_count_spread_after,
                sit_window_max_after: sit_max,
                sit_window_min_after: sit_min,
                sit_window_total_after: sit_total,
                violates_sit_cap: enforce_caps && sit_max > MAX_SITS_IN_WINDOW,
                violates_play_cap: enforce_caps && sit_min < MIN_SITS_IN_WINDOW,
                violates_repeat_window: is_repeated_in_window(
                    &option.matchup_key,
                    recent,
                    HARD_NO_REPEAT_WINDOW,
                ),
                matchup_key: option.matchup_key,
            });
        }
    }

    proposals
}

fn games_played_spread_after(pool: &[&Player], playing: &HashSet<PlayerId>) -> u32 {
    let totals = pool
        .iter()
        .map(|p| p.games_played + u32::from(playing.contains(&p.id)));
    let (min, max) = totals.fold((u32::MAX, 0), |(min, max), t| (min.min(t), max.max(t)));
    max.saturating_sub(min)
}

/// Round-robin preference order; everything ascending except where reversed
fn round_robin_order(a: &Proposal, b: &Proposal) -> Ordering {
    a.violates_repeat_window
        .cmp(&b.violates_repeat_window)
        .then_with(|| a.violates_sit_cap.cmp(&b.violates_sit_cap))
        .then_with(|| a.violates_play_cap.cmp(&b.violates_play_cap))
        .then_with(|| a.sit_window_max_after.cmp(&b.sit_window_max_after))
        .then_with(|| b.sit_window_min_after.cmp(&a.sit_window_min_after))
        .then_with(|| a.sit_window_total_after.cmp(&b.sit_window_total_after))
        .then_with(|| a.partner_usage_max.cmp(&b.partner_usage_max))
        .then_with(|| a.partner_repeat_penalty.cmp(&b.partner_repeat_penalty))
        .then_with(|| a.opponent_usage_max.cmp(&b.opponent_usage_max))
        .then_with(|| a.opponent_repeat_penalty.cmp(&b.opponent_repeat_penalty))
        .then_with(|| b.sit_score.cmp(&a.sit_score))
        .then_with(|| a.play_count_spread_after.cmp(&b.play_count_spread_after))
        .then_with(|| a.play_penalty.cmp(&b.play_penalty))
        .then_with(|| a.balance_diff.total_cmp(&b.balance_diff))
        .then_with(|| a.matchup_key.cmp(&b.matchup_key))
}

/// Recommend the next match for a six-player roster.
///
/// `pool` must be the rest-priority ordered candidate pool and `recent`
/// newest-first history.
pub fn recommend_six_player(
    pool: &[&Player],
    recent: &[RecentMatch],
) -> Result<Recommendation, MatchmakingError> {
    if pool.len() != CANDIDATE_POOL_SIZE {
        return Err(MatchmakingError::InvariantViolation(format!(
            "six-player rotation needs exactly {} candidates, got {}",
            CANDIDATE_POOL_SIZE,
            pool.len()
        )));
    }

    let roster: Vec<PlayerId> = pool.iter().map(|p| p.id).collect();
    let must_play = last_round_sitters(&roster, recent);
    if !matches!(must_play.len(), 0 | 2) {
        return Err(MatchmakingError::InvariantViolation(format!(
            "expected 0 or 2 forced sitters, found {}",
            must_play.len()
        )));
    }

    let mut admissible: Vec<Proposal> = build_proposals(pool, &roster, &must_play, recent)
        .into_iter()
        .filter(Proposal::is_admissible)
        .collect();
    admissible.sort_by(round_robin_order);

    let best = admissible
        .into_iter()
        .next()
        .ok_or(MatchmakingError::NoValidMatchup)?;

    let rotation_reason = if must_play.len() == 2 {
        "6-player mode: previous sitters are forced into the next game"
    } else {
        "6-player mode: round-robin pairing rotation"
    };
    let balance_diff = round2(best.balance_diff);

    Ok(Recommendation {
        player_ids: best.player_ids,
        team_a: best.team_a,
        team_b: best.team_b,
        balance_diff,
        partner_repeat_penalty: best.partner_repeat_penalty,
        reasons: vec![
            rotation_reason.to_string(),
            format!("Hard no-repeat window: {}", HARD_NO_REPEAT_WINDOW),
            format!(
                "{}-match sit cap max after this game: {} (target <= {})",
                SIT_WINDOW_SIZE, best.sit_window_max_after, MAX_SITS_IN_WINDOW
            ),
            format!(
                "{}-match play cap max after this game: {} (target <= {})",
                SIT_WINDOW_SIZE,
                SIT_WINDOW_SIZE as u32 - best.sit_window_min_after.min(SIT_WINDOW_SIZE as u32),
                SIT_WINDOW_SIZE as u32 - MIN_SITS_IN_WINDOW
            ),
            format!("Sat priority score: {}", best.sit_score),
            format!(
                "Partner pair repeat usage: max={}, sum={}",
                best.partner_usage_max, best.partner_repeat_penalty
            ),
            format!(
                "Opponent repeat usage: max={}, sum={}",
                best.opponent_usage_max, best.opponent_repeat_penalty
            ),
            format!(
                "Games played spread after this match: {}",
                best.play_count_spread_after
            ),
            format!("Games played penalty: {}", best.play_penalty),
            format!("Balance difference: {}", balance_diff),
        ],
    })
}
