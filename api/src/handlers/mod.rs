//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod groups;
pub mod matches;
pub mod players;

pub use groups::{create_group, get_group, unlock};
pub use matches::{edit_score, recommend, submit_score};
pub use players::update_players;
