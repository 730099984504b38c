//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;

use crate::domain::entities::{
    Group, GroupCredentials, GroupId, Match, MatchId, NewGroup, NewMatch, NewPlayer, Player,
    PlayerChanges, PlayerId, PresenceUpdate, ScoreEdit,
};
use crate::error::DomainError;

/// Repository for Group entities
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Find a group by its URL slug
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError>;

    /// Find a group with its PIN hash, for unlocking
    async fn find_credentials_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<GroupCredentials>, DomainError>;

    /// Create a new group. Fails with `AlreadyExists` when the slug is taken.
    async fn create(&self, group: &NewGroup) -> Result<Group, DomainError>;
}

/// Repository for Player entities
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// All players in a group, ordered by name
    async fn list(&self, group_id: &GroupId) -> Result<Vec<Player>, DomainError>;

    /// Present players in rest-priority order:
    /// games_since_played desc, games_played asc, id asc
    async fn list_present(&self, group_id: &GroupId) -> Result<Vec<Player>, DomainError>;

    /// Find a player within a group
    async fn find_by_id(
        &self,
        group_id: &GroupId,
        id: &PlayerId,
    ) -> Result<Option<Player>, DomainError>;

    /// Add a player; new players start present with zeroed counters
    async fn create(&self, player: &NewPlayer) -> Result<Player, DomainError>;

    /// Apply a partial profile update. Returns `None` if the player is not in the group.
    async fn update(
        &self,
        group_id: &GroupId,
        id: &PlayerId,
        changes: &PlayerChanges,
    ) -> Result<Option<Player>, DomainError>;

    /// Apply presence changes in one transaction.
    /// Marking a player present resets their rest counter.
    async fn set_presence(
        &self,
        group_id: &GroupId,
        updates: &[PresenceUpdate],
    ) -> Result<(), DomainError>;
}

/// Repository for Match entities
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Most recent matches, newest first (created_at desc, id desc)
    async fn list(&self, group_id: &GroupId, limit: u64) -> Result<Vec<Match>, DomainError>;

    /// Find a match within a group
    async fn find_by_id(
        &self,
        group_id: &GroupId,
        id: &MatchId,
    ) -> Result<Option<Match>, DomainError>;

    /// Persist a completed match in one transaction: insert the match row,
    /// give participants their new rating with games_played + 1 and
    /// games_since_played = 0, and bump games_since_played for every other
    /// present player.
    async fn record(&self, new_match: &NewMatch) -> Result<Match, DomainError>;

    /// Persist a score edit in one transaction: store the new scores and
    /// deltas, then add each adjustment to the player's current rating
    /// (clamped and rounded).
    async fn apply_score_edit(&self, edit: &ScoreEdit) -> Result<Match, DomainError>;
}
