//! Team splitter
//!
//! Given four players, scores the three possible 2v2 partitions and picks
//! the best one under repeat and balance penalties.

use std::cmp::Ordering;

use super::keys::{ordered_pair, MatchupKey, RecentMatch};
use super::tuning::{
    HARD_NO_REPEAT_WINDOW, PAIRING_HISTORY_WINDOW, SPLIT_EXACT_REPEAT_WEIGHT,
    SPLIT_PARTNER_REPEAT_WEIGHT,
};
use crate::domain::entities::{Player, PlayerId};

/// One scored 2v2 partition of four players
#[derive(Debug, Clone, PartialEq)]
pub struct TeamOption {
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
    pub balance_diff: f64,
    pub partner_repeat_penalty: u32,
    pub exact_team_repeat_penalty: u32,
    /// Same matchup as the single most recent match
    pub immediate_exact_repeat: bool,
    /// Same matchup as any match inside the hard no-repeat window
    pub recent_exact_repeat: bool,
    /// Index into newest-first history of the latest identical matchup
    pub last_used_index: Option<usize>,
    pub score: f64,
    pub matchup_key: MatchupKey,
}

/// Score all three partitions `{ab|cd, ac|bd, ad|bc}` against newest-first history
pub fn team_options(players: [&Player; 4], recent: &[RecentMatch]) -> [TeamOption; 3] {
    let [a, b, c, d] = players;
    [
        score_option(a, b, c, d, recent),
        score_option(a, c, b, d, recent),
        score_option(a, d, b, c, recent),
    ]
}

fn score_option(
    a1: &Player,
    a2: &Player,
    b1: &Player,
    b2: &Player,
    recent: &[RecentMatch],
) -> TeamOption {
    let team_a = [a1.id, a2.id];
    let team_b = [b1.id, b2.id];
    let balance_diff = ((a1.rating + a2.rating) - (b1.rating + b2.rating)).abs();
    let matchup_key = MatchupKey::new(&team_a, &team_b);

    let partner_repeat_penalty = count_partner_repeats(&team_a, &team_b, recent);
    let exact_team_repeat_penalty = recent
        .iter()
        .take(PAIRING_HISTORY_WINDOW)
        .filter(|m| m.matchup_key() == matchup_key)
        .count() as u32;
    let last_used_index = recent.iter().position(|m| m.matchup_key() == matchup_key);
    let immediate_exact_repeat = last_used_index == Some(0);
    let recent_exact_repeat = last_used_index.is_some_and(|i| i < HARD_NO_REPEAT_WINDOW);

    let score = balance_diff
        + partner_repeat_penalty as f64 * SPLIT_PARTNER_REPEAT_WEIGHT
        + exact_team_repeat_penalty as f64 * SPLIT_EXACT_REPEAT_WEIGHT;

    TeamOption {
        team_a,
        team_b,
        balance_diff,
        partner_repeat_penalty,
        exact_team_repeat_penalty,
        immediate_exact_repeat,
        recent_exact_repeat,
        last_used_index,
        score,
        matchup_key,
    }
}

/// Times either proposed partnership appeared as a team in the pairing window.
/// Each team counts independently, so one match contributes at most 2.
fn count_partner_repeats(
    team_a: &[PlayerId; 2],
    team_b: &[PlayerId; 2],
    recent: &[RecentMatch],
) -> u32 {
    let key_a = ordered_pair(team_a[0], team_a[1]);
    let key_b = ordered_pair(team_b[0], team_b[1]);

    let mut repeats = 0;
    for m in recent.iter().take(PAIRING_HISTORY_WINDOW) {
        let played_a = ordered_pair(m.team_a[0], m.team_a[1]);
        let played_b = ordered_pair(m.team_b[0], m.team_b[1]);

        if played_a == key_a || played_b == key_a {
            repeats += 1;
        }
        if played_a == key_b || played_b == key_b {
            repeats += 1;
        }
    }
    repeats
}

/// Preference among surviving options: lower score, then the matchup used
/// longest ago (never-used first), then matchup key.
fn option_order(x: &TeamOption, y: &TeamOption) -> Ordering {
    let recency_rank = |o: &TeamOption| o.last_used_index.unwrap_or(usize::MAX);

    x.score
        .total_cmp(&y.score)
        .then_with(|| recency_rank(y).cmp(&recency_rank(x)))
        .then_with(|| x.matchup_key.cmp(&y.matchup_key))
}

/// Best partition of four players.
///
/// Drops an exact repeat of the latest match, then any matchup inside the
/// hard no-repeat window; each filter only applies if something survives it.
pub fn best_team_split(players: [&Player; 4], recent: &[RecentMatch]) -> TeamOption {
    let options: Vec<TeamOption> = team_options(players, recent).into();

    let pool = retain_if_any(options, |o| !o.immediate_exact_repeat);
    let mut pool = retain_if_any(pool, |o| !o.recent_exact_repeat);

    pool.sort_by(option_order);
    // Filters never empty the pool, and it started with three options.
    pool.swap_remove(0)
}

fn retain_if_any(options: Vec<TeamOption>, keep: impl Fn(&TeamOption) -> bool) -> Vec<TeamOption> {
    if options.iter().any(&keep) {
        options.into_iter().filter(|o| keep(o)).collect()
    } else {
        options
    }
}
