//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain logic and the repository ports.

pub mod group_service;
pub mod match_service;
pub mod matchmaker_debug;
pub mod player_service;

pub use group_service::GroupService;
pub use match_service::{MatchService, SubmitOutcome, SubmittedMatch};
pub use matchmaker_debug::MatchmakerDebug;
pub use player_service::{PlayerAction, PlayerService};
