//! Doubles rating engine
//!
//! Elo-style update on a 0-8 scale. The team swing depends on the expected
//! result and the score margin, and is split between partners by leverage:
//! the player facing relatively stronger opposition carries more of it.

use serde::Serialize;

use crate::domain::entities::{PlayerId, RatingMap, MAX_RATING, MIN_RATING};
use crate::error::RatingError;

/// Rating difference at which the expected score is 1:10
pub const ELO_SCALE: f64 = 1.5;

/// Base team swing for an even, narrow result
pub const BASE_K: f64 = 0.2;

/// Score difference that adds one full unit to the margin multiplier
pub const MARGIN_DIVISOR: f64 = 11.0;

/// Weight of a player's own rating in their leverage context
pub const OWN_RATING_WEIGHT: f64 = 0.7;

/// Rating gap that moves leverage by one unit
pub const LEVERAGE_DIVISOR: f64 = 4.0;

pub const MIN_LEVERAGE: f64 = 0.65;
pub const MAX_LEVERAGE: f64 = 1.35;

/// Delta changes at or below this are treated as no change on edit
pub const EDIT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingDiagnostics {
    pub team_expected_a: f64,
    pub margin_multiplier: f64,
    pub team_total_delta_a: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingUpdate {
    /// Reported change per participant: new rating minus old rating
    pub deltas_by_id: RatingMap,
    pub new_ratings_by_id: RatingMap,
    pub diagnostics: RatingDiagnostics,
}

/// Incremental correction to a player's current rating after a score edit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingAdjustment {
    pub player_id: PlayerId,
    pub delta: f64,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Round to the 3 decimals ratings are stored with
pub fn round_rating(value: f64) -> f64 {
    round3(value)
}

fn clamp_rating(value: f64) -> f64 {
    value.clamp(MIN_RATING, MAX_RATING)
}

fn rating_of(ratings: &RatingMap, player_id: PlayerId) -> Result<f64, RatingError> {
    ratings
        .get(&player_id)
        .filter(|r| r.is_finite())
        .ok_or(RatingError::MissingRating(player_id))
}

fn leverage(own: f64, partner: f64, opponent_avg: f64) -> f64 {
    let context = own * OWN_RATING_WEIGHT + partner * (1.0 - OWN_RATING_WEIGHT);
    (1.0 + (opponent_avg - context) / LEVERAGE_DIVISOR).clamp(MIN_LEVERAGE, MAX_LEVERAGE)
}

fn normalize_pair(a: f64, b: f64) -> (f64, f64) {
    let sum = a + b;
    if sum <= 0.0 {
        return (0.5, 0.5);
    }
    (a / sum, b / sum)
}

/// Round raw deltas to 3 decimals and push the rounding residual onto the
/// largest-magnitude entry so the rounded deltas still sum to zero.
fn absorb_rounding_drift(raw: [f64; 4]) -> [f64; 4] {
    let mut rounded = raw.map(round3);
    let residual: f64 = rounded.iter().sum();
    if residual.abs() > 1e-9 {
        let largest = (1..4).fold(0, |best, i| {
            if rounded[i].abs() > rounded[best].abs() {
                i
            } else {
                best
            }
        });
        rounded[largest] = round3(rounded[largest] - residual);
    }
    rounded
}

/// Rate a completed doubles match from the participants' pre-match ratings.
///
/// Reported deltas are recomputed from the rounded, clamped new ratings, so
/// they always describe the actual movement of each rating.
pub fn calculate_doubles_update(
    ratings: &RatingMap,
    team_a: &[PlayerId],
    team_b: &[PlayerId],
    score_a: u8,
    score_b: u8,
) -> Result<RatingUpdate, RatingError> {
    let (&[a1, a2], &[b1, b2]) = (team_a, team_b) else {
        return Err(RatingError::BadTeamShape {
            team_a: team_a.len(),
            team_b: team_b.len(),
        });
    };

    let ids = [a1, a2, b1, b2];
    let mut old = [0.0; 4];
    for (slot, id) in old.iter_mut().zip(ids) {
        *slot = rating_of(ratings, id)?;
    }
    let [a1_rating, a2_rating, b1_rating, b2_rating] = old;

    let avg_a = (a1_rating + a2_rating) / 2.0;
    let avg_b = (b1_rating + b2_rating) / 2.0;

    let expected_a = 1.0 / (1.0 + 10f64.powf((avg_b - avg_a) / ELO_SCALE));
    let actual_a = match score_a.cmp(&score_b) {
        std::cmp::Ordering::Greater => 1.0,
        std::cmp::Ordering::Less => 0.0,
        std::cmp::Ordering::Equal => 0.5,
    };
    let margin = 1.0 + f64::from(score_a.abs_diff(score_b)) / MARGIN_DIVISOR;
    let team_delta_a = BASE_K * margin * (actual_a - expected_a) * 2.0;
    let team_delta_b = -team_delta_a;

    let (share_a1, share_a2) = normalize_pair(
        leverage(a1_rating, a2_rating, avg_b),
        leverage(a2_rating, a1_rating, avg_b),
    );
    let (share_b1, share_b2) = normalize_pair(
        leverage(b1_rating, b2_rating, avg_a),
        leverage(b2_rating, b1_rating, avg_a),
    );

    let deltas = absorb_rounding_drift([
        team_delta_a * share_a1,
        team_delta_a * share_a2,
        team_delta_b * share_b1,
        team_delta_b * share_b2,
    ]);

    let mut deltas_by_id = RatingMap::new();
    let mut new_ratings_by_id = RatingMap::new();
    for ((id, old_rating), delta) in ids.into_iter().zip(old).zip(deltas) {
        let new_rating = round3(clamp_rating(old_rating + delta));
        new_ratings_by_id.insert(id, new_rating);
        deltas_by_id.insert(id, new_rating - old_rating);
    }

    Ok(RatingUpdate {
        deltas_by_id,
        new_ratings_by_id,
        diagnostics: RatingDiagnostics {
            team_expected_a: round3(expected_a),
            margin_multiplier: round3(margin),
            team_total_delta_a: round3(team_delta_a),
        },
    })
}

/// Per-player difference between freshly computed and previously stored
/// deltas, in `player_ids` order. Missing entries count as zero.
pub fn build_edit_adjustments(
    player_ids: &[PlayerId],
    old_deltas: &RatingMap,
    new_deltas: &RatingMap,
) -> Vec<RatingAdjustment> {
    player_ids
        .iter()
        .filter_map(|id| {
            let delta = new_deltas.get(id).unwrap_or(0.0) - old_deltas.get(id).unwrap_or(0.0);
            (delta.abs() >= EDIT_TOLERANCE).then_some(RatingAdjustment {
                player_id: *id,
                delta,
            })
        })
        .collect()
}

/// Apply an edit adjustment to a player's current rating
pub fn apply_adjustment(current: f64, delta: f64) -> f64 {
    round3(clamp_rating(current + delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::player_id;

    fn ratings(values: [f64; 4]) -> RatingMap {
        (1..=4).map(player_id).zip(values).collect()
    }

    fn teams() -> ([PlayerId; 2], [PlayerId; 2]) {
        ([player_id(1), player_id(2)], [player_id(3), player_id(4)])
    }

    #[test]
    fn even_match_splits_swing_equally() {
        let (a, b) = teams();
        let update = calculate_doubles_update(&ratings([3.5; 4]), &a, &b, 11, 5).unwrap();

        assert_eq!(update.diagnostics.team_expected_a, 0.5);
        assert_eq!(update.diagnostics.margin_multiplier, 1.545);
        for id in a {
            assert!((update.deltas_by_id.get(&id).unwrap() - 0.1545).abs() < 1e-3);
        }
        for id in b {
            assert!((update.deltas_by_id.get(&id).unwrap() + 0.1545).abs() < 1e-3);
        }
        assert!(update.deltas_by_id.total().abs() < 1e-6);
        assert_eq!(update.new_ratings_by_id.get(&a[0]), Some(3.655));
        assert_eq!(update.new_ratings_by_id.get(&b[0]), Some(3.345));
    }

    #[test]
    fn deltas_are_zero_sum() {
        let (a, b) = teams();
        let cases = [
            ([3.1, 4.2, 2.75, 5.0], 11, 9),
            ([2.0, 2.0, 6.5, 1.25], 3, 11),
            ([4.444, 3.333, 3.9, 3.7], 15, 13),
            ([1.0, 7.0, 4.0, 4.0], 8, 8),
            ([5.5, 5.25, 2.125, 3.875], 0, 21),
        ];

        for (values, score_a, score_b) in cases {
            let update =
                calculate_doubles_update(&ratings(values), &a, &b, score_a, score_b).unwrap();
            assert!(
                update.deltas_by_id.total().abs() < 1e-6,
                "sum {} for {:?} {}-{}",
                update.deltas_by_id.total(),
                values,
                score_a,
                score_b
            );
        }
    }

    #[test]
    fn deltas_are_zero_sum_for_any_stored_ratings() {
        let (a, b) = teams();
        let values = [1.001, 2.345, 3.5, 3.999, 4.567, 5.123, 6.789];
        let scores = [(11, 5), (11, 9), (3, 11), (7, 7)];
        let mut worst: f64 = 0.0;

        for &r1 in &values {
            for &r2 in &values {
                for &r3 in &values {
                    for &r4 in &values {
                        for (score_a, score_b) in scores {
                            let update = calculate_doubles_update(
                                &ratings([r1, r2, r3, r4]),
                                &a,
                                &b,
                                score_a,
                                score_b,
                            )
                            .unwrap();
                            worst = worst.max(update.deltas_by_id.total().abs());
                        }
                    }
                }
            }
        }

        assert!(worst < 1e-6, "worst delta sum {}", worst);
    }

    #[test]
    fn round_rating_keeps_three_decimals() {
        assert_eq!(round_rating(3.1234), 3.123);
        assert_eq!(round_rating(4.56789), 4.568);
        assert_eq!(round_rating(2.0006), 2.001);
    }

    #[test]
    fn favourite_gains_less_for_a_win() {
        let (a, b) = teams();
        let favoured = calculate_doubles_update(&ratings([5.0, 5.0, 3.0, 3.0]), &a, &b, 11, 9)
            .unwrap();
        let underdog = calculate_doubles_update(&ratings([3.0, 3.0, 5.0, 5.0]), &a, &b, 11, 9)
            .unwrap();

        assert!(favoured.diagnostics.team_total_delta_a > 0.0);
        assert!(underdog.diagnostics.team_total_delta_a > favoured.diagnostics.team_total_delta_a);
    }

    #[test]
    fn weaker_partner_carries_more_of_the_swing() {
        let (a, b) = teams();
        let update = calculate_doubles_update(&ratings([2.5, 4.5, 3.5, 3.5]), &a, &b, 11, 4)
            .unwrap();

        let weaker = update.deltas_by_id.get(&a[0]).unwrap();
        let stronger = update.deltas_by_id.get(&a[1]).unwrap();
        assert!(weaker > stronger);
    }

    #[test]
    fn ratings_stay_in_bounds() {
        let (a, b) = teams();
        let high = calculate_doubles_update(&ratings([7.99, 7.98, 0.5, 0.5]), &a, &b, 99, 0).unwrap();
        let low = calculate_doubles_update(&ratings([0.01, 0.02, 7.5, 7.5]), &a, &b, 0, 99).unwrap();

        for update in [high, low] {
            for (_, rating) in update.new_ratings_by_id.iter() {
                assert!((MIN_RATING..=MAX_RATING).contains(rating));
            }
        }
    }

    #[test]
    fn missing_rating_is_an_error() {
        let (a, b) = teams();
        let mut partial = ratings([3.5; 4]);
        partial = partial
            .iter()
            .filter(|(id, _)| **id != player_id(3))
            .map(|(id, r)| (*id, *r))
            .collect();

        assert_eq!(
            calculate_doubles_update(&partial, &a, &b, 11, 5),
            Err(RatingError::MissingRating(player_id(3)))
        );
    }

    #[test]
    fn bad_team_shape_is_an_error() {
        let (a, b) = teams();
        let three = [a[0], a[1], b[0]];

        assert_eq!(
            calculate_doubles_update(&ratings([3.5; 4]), &three, &b[1..], 11, 5),
            Err(RatingError::BadTeamShape { team_a: 3, team_b: 1 })
        );
    }

    #[test]
    fn edit_adjustments_are_net_differences() {
        let ids = [1, 2, 3, 4].map(player_id);
        let old = ratings([0.1, 0.1, -0.1, -0.1]);
        let new = ratings([0.05, 0.12, -0.07, -0.1]);

        let adjustments = build_edit_adjustments(&ids, &old, &new);

        assert_eq!(adjustments.len(), 3);
        assert_eq!(adjustments[0].player_id, ids[0]);
        assert_eq!(adjustments[1].player_id, ids[1]);
        assert_eq!(adjustments[2].player_id, ids[2]);
        assert!((adjustments[0].delta + 0.05).abs() < 1e-12);
        assert!((adjustments[1].delta - 0.02).abs() < 1e-12);
        assert!((adjustments[2].delta - 0.03).abs() < 1e-12);
    }

    #[test]
    fn edit_adjustments_drop_negligible_changes() {
        let id = player_id(1);
        let old: RatingMap = [(id, 0.2)].into_iter().collect();
        let new: RatingMap = [(id, 0.2000000000001)].into_iter().collect();

        assert!(build_edit_adjustments(&[id], &old, &new).is_empty());
    }

    #[test]
    fn re_editing_to_the_same_score_is_a_no_op() {
        let (a, b) = teams();
        let snapshot = ratings([3.2, 3.9, 3.4, 3.6]);
        let ids = [a[0], a[1], b[0], b[1]];

        let original = calculate_doubles_update(&snapshot, &a, &b, 11, 7).unwrap();
        let edited = calculate_doubles_update(&snapshot, &a, &b, 7, 11).unwrap();
        let first = build_edit_adjustments(&ids, &original.deltas_by_id, &edited.deltas_by_id);
        assert_eq!(first.len(), 4);

        let again = calculate_doubles_update(&snapshot, &a, &b, 7, 11).unwrap();
        assert!(build_edit_adjustments(&ids, &edited.deltas_by_id, &again.deltas_by_id).is_empty());
    }

    #[test]
    fn adjustments_are_clamped_and_rounded() {
        assert_eq!(apply_adjustment(7.95, 0.2), MAX_RATING);
        assert_eq!(apply_adjustment(0.05, -0.2), MIN_RATING);
        assert_eq!(apply_adjustment(3.5, 0.12345), 3.623);
    }
}
