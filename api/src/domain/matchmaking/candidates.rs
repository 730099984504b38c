//! Candidate selection
//!
//! Ranks present players by rest priority and trims to the working set the
//! recommenders search over.

use std::cmp::Ordering;

use super::tuning::CANDIDATE_POOL_SIZE;
use crate::domain::entities::Player;

/// Rest priority: longest rested first, then fewest games played, then id.
///
/// Ids are unique, so this is a total order and ranking is deterministic
/// regardless of input order.
pub fn rest_priority_order(a: &Player, b: &Player) -> Ordering {
    b.games_since_played
        .cmp(&a.games_since_played)
        .then_with(|| a.games_played.cmp(&b.games_played))
        .then_with(|| a.id.cmp(&b.id))
}

/// All players sorted by rest priority
pub fn rank_by_rest_priority(players: &[Player]) -> Vec<&Player> {
    let mut ranked: Vec<&Player> = players.iter().collect();
    ranked.sort_by(|a, b| rest_priority_order(a, b));
    ranked
}

/// The first `min(CANDIDATE_POOL_SIZE, n)` players by rest priority
pub fn candidate_pool(players: &[Player]) -> Vec<&Player> {
    let mut ranked = rank_by_rest_priority(players);
    ranked.truncate(CANDIDATE_POOL_SIZE);
    ranked
}

/// Every 4-element index subset of `0..n`, in lexicographic order.
///
/// The order is part of the contract: recommenders keep the first-seen
/// candidate on ties.
pub fn four_subsets(n: usize) -> Vec<[usize; 4]> {
    let mut out = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                for l in (k + 1)..n {
                    out.push([i, j, k, l]);
                }
            }
        }
    }
    out
}
