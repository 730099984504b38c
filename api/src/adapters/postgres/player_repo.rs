//! PostgreSQL adapter for PlayerRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::entities::{
    GroupId, NewPlayer, Player, PlayerChanges, PlayerId, PresenceUpdate,
};
use crate::domain::matchmaking::candidates::rest_priority_order;
use crate::domain::ports::PlayerRepository;
use crate::entity::players;
use crate::error::DomainError;

/// PostgreSQL implementation of PlayerRepository
pub struct PostgresPlayerRepository {
    db: DatabaseConnection,
}

impl PostgresPlayerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(
        &self,
        group_id: &GroupId,
        id: &PlayerId,
    ) -> Result<Option<players::Model>, DomainError> {
        players::Entity::find_by_id(id.0)
            .filter(players::Column::GroupId.eq(group_id.0))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    async fn list(&self, group_id: &GroupId) -> Result<Vec<Player>, DomainError> {
        let results = players::Entity::find()
            .filter(players::Column::GroupId.eq(group_id.0))
            .order_by_asc(players::Column::Name)
            .order_by_asc(players::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn list_present(&self, group_id: &GroupId) -> Result<Vec<Player>, DomainError> {
        let results = players::Entity::find()
            .filter(players::Column::GroupId.eq(group_id.0))
            .filter(players::Column::IsPresent.eq(true))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        // Sorted here so the tie-break on id matches the matchmaker's ordering
        let mut present: Vec<Player> = results.into_iter().map(|m| m.into()).collect();
        present.sort_by(rest_priority_order);
        Ok(present)
    }

    async fn find_by_id(
        &self,
        group_id: &GroupId,
        id: &PlayerId,
    ) -> Result<Option<Player>, DomainError> {
        Ok(self.find_model(group_id, id).await?.map(|m| m.into()))
    }

    async fn create(&self, player: &NewPlayer) -> Result<Player, DomainError> {
        let model = players::ActiveModel {
            id: Set(Uuid::new_v4()),
            group_id: Set(player.group_id.0),
            name: Set(player.name.clone()),
            rating: Set(player.rating),
            is_present: Set(true),
            games_since_played: Set(0),
            games_played: Set(0),
            created_at: Set(Some(Utc::now().fixed_offset())),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn update(
        &self,
        group_id: &GroupId,
        id: &PlayerId,
        changes: &PlayerChanges,
    ) -> Result<Option<Player>, DomainError> {
        let Some(existing) = self.find_model(group_id, id).await? else {
            return Ok(None);
        };

        let mut active_model = existing.clone().into_active_model();
        if let Some(name) = &changes.name {
            active_model.name = Set(name.clone());
        }
        if let Some(rating) = changes.rating {
            active_model.rating = Set(rating);
        }
        if !active_model.is_changed() {
            return Ok(Some(existing.into()));
        }

        let result = active_model
            .update(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(Some(result.into()))
    }

    async fn set_presence(
        &self,
        group_id: &GroupId,
        updates: &[PresenceUpdate],
    ) -> Result<(), DomainError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        for update in updates {
            let model = players::Entity::find_by_id(update.player_id.0)
                .filter(players::Column::GroupId.eq(group_id.0))
                .one(&txn)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;

            let Some(model) = model else {
                tracing::debug!(player_id = %update.player_id, "Presence update for unknown player");
                continue;
            };

            let mut player: Player = model.clone().into();
            player.set_present(update.is_present);

            let mut active_model = model.into_active_model();
            active_model.is_present = Set(player.is_present);
            active_model.games_since_played = Set(counter(player.games_since_played));
            active_model
                .update(&txn)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Domain counters are unsigned; the columns are INTEGER
pub(super) fn counter(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Convert SeaORM model to domain entity
impl From<players::Model> for Player {
    fn from(model: players::Model) -> Self {
        Player {
            id: PlayerId(model.id),
            group_id: GroupId(model.group_id),
            name: model.name,
            rating: model.rating,
            is_present: model.is_present,
            games_since_played: model.games_since_played.max(0) as u32,
            games_played: model.games_played.max(0) as u32,
            created_at: model
                .created_at
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now),
        }
    }
}
