//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: Groups, players, matches and recommendations
//! - `ports`: Trait definitions for storage
//! - `matchmaking`: Choosing the next doubles match
//! - `rating`: Rating updates for completed and edited matches

pub mod entities;
pub mod matchmaking;
pub mod ports;
pub mod rating;
