//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Ids are derived from small integers so that ordering in tests is obvious:
//! `player_id(1) < player_id(2) < ...`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::entities::{Group, GroupId, Match, MatchId, Player, PlayerId, RatingMap};

/// The group every fixture player belongs to
pub fn test_group_id() -> GroupId {
    GroupId(Uuid::from_u128(0xC0_u128))
}

/// Create a test group with the given slug
pub fn test_group(slug: &str) -> Group {
    Group {
        id: test_group_id(),
        name: format!("Group {}", slug),
        slug: slug.to_string(),
        created_at: at_second(0),
    }
}

/// Deterministic player id
pub fn player_id(n: u128) -> PlayerId {
    PlayerId(Uuid::from_u128(n))
}

/// Create a present player rated 3.5 with zeroed counters
pub fn test_player(n: u128) -> Player {
    test_player_rated(n, 3.5)
}

/// Create a present player with a specific rating
pub fn test_player_rated(n: u128, rating: f64) -> Player {
    Player {
        id: player_id(n),
        group_id: test_group_id(),
        name: format!("Player {}", n),
        rating,
        is_present: true,
        games_since_played: 0,
        games_played: 0,
        created_at: at_second(0),
    }
}

/// A fixed instant plus `seconds`
pub fn at_second(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
}

/// Create a recorded match between `team_a` and `team_b` with no rating data
pub fn test_match(team_a: [PlayerId; 2], team_b: [PlayerId; 2], created_second: i64) -> Match {
    Match {
        id: MatchId::new(),
        group_id: test_group_id(),
        created_at: at_second(created_second),
        players: [team_a[0], team_a[1], team_b[0], team_b[1]],
        team_a,
        team_b,
        score_a: 11,
        score_b: 7,
        rating_deltas: RatingMap::new(),
        pre_match_ratings: RatingMap::new(),
    }
}
