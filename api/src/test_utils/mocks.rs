//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::fixtures::at_second;
use crate::domain::entities::{
    Group, GroupCredentials, GroupId, Match, MatchId, NewGroup, NewMatch, NewPlayer, Player,
    PlayerChanges, PlayerId, PresenceUpdate, ScoreEdit,
};
use crate::domain::matchmaking::candidates::rest_priority_order;
use crate::domain::ports::{GroupRepository, MatchRepository, PlayerRepository};
use crate::domain::rating::apply_adjustment;
use crate::error::DomainError;

// ============================================================================
// In-Memory Group Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryGroupRepository {
    groups: Arc<RwLock<HashMap<String, GroupCredentials>>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a group for testing
    pub fn with_group(self, group: Group, pin_hash: &str) -> Self {
        self.groups.write().unwrap().insert(
            group.slug.clone(),
            GroupCredentials {
                group,
                pin_hash: pin_hash.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        let groups = self.groups.read().unwrap();
        Ok(groups.get(slug).map(|c| c.group.clone()))
    }

    async fn find_credentials_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<GroupCredentials>, DomainError> {
        let groups = self.groups.read().unwrap();
        Ok(groups.get(slug).cloned())
    }

    async fn create(&self, new_group: &NewGroup) -> Result<Group, DomainError> {
        let mut groups = self.groups.write().unwrap();
        if groups.contains_key(&new_group.slug) {
            return Err(DomainError::AlreadyExists(format!(
                "group slug '{}'",
                new_group.slug
            )));
        }

        let group = Group {
            id: GroupId::new(),
            name: new_group.name.clone(),
            slug: new_group.slug.clone(),
            created_at: chrono::Utc::now(),
        };
        groups.insert(
            new_group.slug.clone(),
            GroupCredentials {
                group: group.clone(),
                pin_hash: new_group.pin_hash.clone(),
            },
        );
        Ok(group)
    }
}

// ============================================================================
// In-Memory Player Repository
// ============================================================================

/// Cloning shares the underlying storage, so a match repository can
/// update the same players a test inspects.
#[derive(Default, Clone)]
pub struct InMemoryPlayerRepository {
    players: Arc<RwLock<HashMap<PlayerId, Player>>>,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with players for testing
    pub fn with_players(self, players: impl IntoIterator<Item = Player>) -> Self {
        {
            let mut stored = self.players.write().unwrap();
            for player in players {
                stored.insert(player.id, player);
            }
        }
        self
    }

    /// Current state of a player
    pub fn get(&self, id: &PlayerId) -> Option<Player> {
        self.players.read().unwrap().get(id).cloned()
    }

    fn modify<T>(&self, f: impl FnOnce(&mut HashMap<PlayerId, Player>) -> T) -> T {
        let mut players = self.players.write().unwrap();
        f(&mut players)
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn list(&self, group_id: &GroupId) -> Result<Vec<Player>, DomainError> {
        let players = self.players.read().unwrap();
        let mut result: Vec<Player> = players
            .values()
            .filter(|p| p.group_id == *group_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn list_present(&self, group_id: &GroupId) -> Result<Vec<Player>, DomainError> {
        let players = self.players.read().unwrap();
        let mut result: Vec<Player> = players
            .values()
            .filter(|p| p.group_id == *group_id && p.is_present)
            .cloned()
            .collect();
        result.sort_by(rest_priority_order);
        Ok(result)
    }

    async fn find_by_id(
        &self,
        group_id: &GroupId,
        id: &PlayerId,
    ) -> Result<Option<Player>, DomainError> {
        let players = self.players.read().unwrap();
        Ok(players.get(id).filter(|p| p.group_id == *group_id).cloned())
    }

    async fn create(&self, new_player: &NewPlayer) -> Result<Player, DomainError> {
        let player = Player {
            id: PlayerId::new(),
            group_id: new_player.group_id,
            name: new_player.name.clone(),
            rating: new_player.rating,
            is_present: true,
            games_since_played: 0,
            games_played: 0,
            created_at: chrono::Utc::now(),
        };
        self.players.write().unwrap().insert(player.id, player.clone());
        Ok(player)
    }

    async fn update(
        &self,
        group_id: &GroupId,
        id: &PlayerId,
        changes: &PlayerChanges,
    ) -> Result<Option<Player>, DomainError> {
        Ok(self.modify(|players| {
            let player = players.get_mut(id).filter(|p| p.group_id == *group_id)?;
            if let Some(name) = &changes.name {
                player.name = name.clone();
            }
            if let Some(rating) = changes.rating {
                player.rating = rating;
            }
            Some(player.clone())
        }))
    }

    async fn set_presence(
        &self,
        group_id: &GroupId,
        updates: &[PresenceUpdate],
    ) -> Result<(), DomainError> {
        self.modify(|players| {
            for update in updates {
                if let Some(player) = players
                    .get_mut(&update.player_id)
                    .filter(|p| p.group_id == *group_id)
                {
                    player.set_present(update.is_present);
                }
            }
        });
        Ok(())
    }
}

// ============================================================================
// In-Memory Match Repository
// ============================================================================

/// Shares player storage with an `InMemoryPlayerRepository` so recording a
/// match updates counters and ratings the way the database transaction does.
/// Each recorded match is one second newer than the last.
pub struct InMemoryMatchRepository {
    matches: Arc<RwLock<Vec<Match>>>,
    players: InMemoryPlayerRepository,
    clock: Arc<RwLock<i64>>,
}

impl InMemoryMatchRepository {
    pub fn new(players: InMemoryPlayerRepository) -> Self {
        Self {
            matches: Arc::new(RwLock::new(Vec::new())),
            players,
            clock: Arc::new(RwLock::new(0)),
        }
    }

    /// Pre-populate with a match for testing
    pub fn with_match(self, m: Match) -> Self {
        {
            let mut clock = self.clock.write().unwrap();
            *clock = (*clock).max(m.created_at.timestamp() - at_second(0).timestamp());
        }
        self.matches.write().unwrap().push(m);
        self
    }

    pub fn count(&self) -> usize {
        self.matches.read().unwrap().len()
    }

    fn tick(&self) -> i64 {
        let mut clock = self.clock.write().unwrap();
        *clock += 1;
        *clock
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn list(&self, group_id: &GroupId, limit: u64) -> Result<Vec<Match>, DomainError> {
        let matches = self.matches.read().unwrap();
        let mut result: Vec<Match> = matches
            .iter()
            .filter(|m| m.group_id == *group_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        result.truncate(limit as usize);
        Ok(result)
    }

    async fn find_by_id(
        &self,
        group_id: &GroupId,
        id: &MatchId,
    ) -> Result<Option<Match>, DomainError> {
        let matches = self.matches.read().unwrap();
        Ok(matches
            .iter()
            .find(|m| m.id == *id && m.group_id == *group_id)
            .cloned())
    }

    async fn record(&self, new_match: &NewMatch) -> Result<Match, DomainError> {
        let recorded = Match {
            id: MatchId::new(),
            group_id: new_match.group_id,
            created_at: at_second(self.tick()),
            players: new_match.players,
            team_a: new_match.team_a,
            team_b: new_match.team_b,
            score_a: new_match.score_a,
            score_b: new_match.score_b,
            rating_deltas: new_match.rating_deltas.clone(),
            pre_match_ratings: new_match.pre_match_ratings.clone(),
        };

        self.players.modify(|players| {
            for player in players
                .values_mut()
                .filter(|p| p.group_id == new_match.group_id)
            {
                if new_match.players.contains(&player.id) {
                    let rating = new_match.new_ratings.get(&player.id).unwrap_or(player.rating);
                    player.record_played(rating);
                } else if player.is_present {
                    player.record_sat_out();
                }
            }
        });

        self.matches.write().unwrap().push(recorded.clone());
        Ok(recorded)
    }

    async fn apply_score_edit(&self, edit: &ScoreEdit) -> Result<Match, DomainError> {
        let updated = {
            let mut matches = self.matches.write().unwrap();
            let m = matches
                .iter_mut()
                .find(|m| m.id == edit.match_id && m.group_id == edit.group_id)
                .ok_or_else(|| DomainError::NotFound(format!("match {}", edit.match_id)))?;
            m.score_a = edit.score_a;
            m.score_b = edit.score_b;
            m.rating_deltas = edit.rating_deltas.clone();
            m.clone()
        };

        self.players.modify(|players| {
            for adjustment in &edit.adjustments {
                if let Some(player) = players.get_mut(&adjustment.player_id) {
                    player.rating = apply_adjustment(player.rating, adjustment.delta);
                }
            }
        });

        Ok(updated)
    }
}
