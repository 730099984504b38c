//! Player service
//!
//! Roster management for a group: adding players, editing profiles, and
//! marking who is present at the courts.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::entities::{
    is_valid_rating, GroupId, NewPlayer, Player, PlayerChanges, PlayerId, PresenceUpdate,
    MAX_RATING, MIN_RATING,
};
use crate::domain::ports::PlayerRepository;
use crate::domain::rating::round_rating;
use crate::error::{AppError, DomainError};

/// Longest allowed player name, after trimming
pub const MAX_PLAYER_NAME_LEN: usize = 80;

/// A roster mutation, tagged by `action`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    Add {
        name: String,
        rating: f64,
    },
    Presence {
        updates: Vec<PresenceUpdate>,
    },
    Update {
        player_id: PlayerId,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        rating: Option<f64>,
    },
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_PLAYER_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "Player name must be 1-{} characters",
            MAX_PLAYER_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_rating(rating: f64) -> Result<f64, DomainError> {
    if !is_valid_rating(rating) {
        return Err(DomainError::Validation(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    Ok(round_rating(rating))
}

/// Service for managing a group's players
pub struct PlayerService<PR>
where
    PR: PlayerRepository,
{
    players: Arc<PR>,
}

impl<PR> PlayerService<PR>
where
    PR: PlayerRepository,
{
    pub fn new(players: Arc<PR>) -> Self {
        Self { players }
    }

    /// The group's roster ordered by name
    pub async fn list(&self, group_id: &GroupId) -> Result<Vec<Player>, AppError> {
        Ok(self.players.list(group_id).await?)
    }

    /// Apply a roster mutation and return the updated roster
    pub async fn apply(
        &self,
        group_id: &GroupId,
        action: PlayerAction,
    ) -> Result<Vec<Player>, AppError> {
        match action {
            PlayerAction::Add { name, rating } => {
                let player = self
                    .players
                    .create(&NewPlayer {
                        group_id: *group_id,
                        name: validate_name(&name)?,
                        rating: validate_rating(rating)?,
                    })
                    .await?;
                tracing::info!(group_id = %group_id, player_id = %player.id, "Player added");
            }
            PlayerAction::Presence { updates } => {
                if !updates.is_empty() {
                    self.players.set_presence(group_id, &updates).await?;
                    tracing::debug!(group_id = %group_id, count = updates.len(), "Presence updated");
                }
            }
            PlayerAction::Update {
                player_id,
                name,
                rating,
            } => {
                let changes = PlayerChanges {
                    name: name.as_deref().map(validate_name).transpose()?,
                    rating: rating.map(validate_rating).transpose()?,
                };
                self.players
                    .update(group_id, &player_id, &changes)
                    .await?
                    .ok_or_else(|| {
                        DomainError::NotFound(format!("Player not found: {}", player_id))
                    })?;
            }
        }

        self.list(group_id).await
    }
}
