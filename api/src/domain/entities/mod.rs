//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod group;
pub mod match_record;
pub mod player;
pub mod recommendation;

pub use group::{Group, GroupCredentials, GroupId, NewGroup};
pub use match_record::{Match, MatchId, NewMatch, RatingMap, ScoreEdit, MAX_SCORE};
pub use player::{
    is_valid_rating, NewPlayer, Player, PlayerChanges, PlayerId, PresenceUpdate, MAX_RATING,
    MIN_RATING,
};
pub use recommendation::Recommendation;
