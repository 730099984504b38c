//! PostgreSQL adapter for MatchRepository
//!
//! Recording a match and editing a score each touch several rows (the match
//! plus player counters and ratings), so both run inside a transaction.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::player_repo::counter;
use crate::domain::entities::{
    GroupId, Match, MatchId, NewMatch, Player, PlayerId, RatingMap, ScoreEdit,
};
use crate::domain::ports::MatchRepository;
use crate::domain::rating::apply_adjustment;
use crate::entity::{matches, players};
use crate::error::DomainError;

/// PostgreSQL implementation of MatchRepository
pub struct PostgresMatchRepository {
    db: DatabaseConnection,
}

impl PostgresMatchRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn begin(&self) -> Result<DatabaseTransaction, DomainError> {
        self.db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

async fn save_player(
    txn: &DatabaseTransaction,
    model: players::Model,
    player: &Player,
) -> Result<(), DomainError> {
    let mut active_model = model.into_active_model();
    active_model.rating = Set(player.rating);
    active_model.games_played = Set(counter(player.games_played));
    active_model.games_since_played = Set(counter(player.games_since_played));
    active_model
        .update(txn)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    async fn list(&self, group_id: &GroupId, limit: u64) -> Result<Vec<Match>, DomainError> {
        let results = matches::Entity::find()
            .filter(matches::Column::GroupId.eq(group_id.0))
            .order_by_desc(matches::Column::CreatedAt)
            .order_by_desc(matches::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results.into_iter().map(Match::try_from).collect()
    }

    async fn find_by_id(
        &self,
        group_id: &GroupId,
        id: &MatchId,
    ) -> Result<Option<Match>, DomainError> {
        let result = matches::Entity::find_by_id(id.0)
            .filter(matches::Column::GroupId.eq(group_id.0))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(Match::try_from).transpose()
    }

    async fn record(&self, new_match: &NewMatch) -> Result<Match, DomainError> {
        let txn = self.begin().await?;

        let model = matches::ActiveModel {
            id: Set(Uuid::new_v4()),
            group_id: Set(new_match.group_id.0),
            created_at: Set(Utc::now().fixed_offset()),
            players: Set(to_json(&new_match.players)?),
            team_a: Set(to_json(&new_match.team_a)?),
            team_b: Set(to_json(&new_match.team_b)?),
            score_a: Set(i16::from(new_match.score_a)),
            score_b: Set(i16::from(new_match.score_b)),
            rating_deltas: Set(new_match.rating_deltas.to_json()),
            pre_match_ratings: Set(new_match.pre_match_ratings.to_json()),
        };
        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let group_players = players::Entity::find()
            .filter(players::Column::GroupId.eq(new_match.group_id.0))
            .all(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        for model in group_players {
            let mut player: Player = model.clone().into();
            if new_match.players.contains(&player.id) {
                let rating = new_match
                    .new_ratings
                    .get(&player.id)
                    .unwrap_or(player.rating);
                player.record_played(rating);
            } else if player.is_present {
                player.record_sat_out();
            } else {
                continue;
            }
            save_player(&txn, model, &player).await?;
        }

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Match::try_from(inserted)
    }

    async fn apply_score_edit(&self, edit: &ScoreEdit) -> Result<Match, DomainError> {
        let txn = self.begin().await?;

        let existing = matches::Entity::find_by_id(edit.match_id.0)
            .filter(matches::Column::GroupId.eq(edit.group_id.0))
            .one(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound(format!("Match {}", edit.match_id)))?;

        let mut active_model = existing.into_active_model();
        active_model.score_a = Set(i16::from(edit.score_a));
        active_model.score_b = Set(i16::from(edit.score_b));
        active_model.rating_deltas = Set(edit.rating_deltas.to_json());
        let updated = active_model
            .update(&txn)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        for adjustment in &edit.adjustments {
            let model = players::Entity::find_by_id(adjustment.player_id.0)
                .filter(players::Column::GroupId.eq(edit.group_id.0))
                .one(&txn)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;

            let Some(model) = model else {
                tracing::warn!(
                    match_id = %edit.match_id,
                    player_id = %adjustment.player_id,
                    "Score edit adjustment for a player no longer in the group"
                );
                continue;
            };

            let mut player: Player = model.clone().into();
            player.rating = apply_adjustment(player.rating, adjustment.delta);
            save_player(&txn, model, &player).await?;
        }

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Match::try_from(updated)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::Internal(e.to_string()))
}

fn from_json<T: DeserializeOwned>(
    id: Uuid,
    column: &str,
    value: serde_json::Value,
) -> Result<T, DomainError> {
    serde_json::from_value(value).map_err(|e| {
        DomainError::Database(format!("match {} has malformed {}: {}", id, column, e))
    })
}

fn score(id: Uuid, value: i16) -> Result<u8, DomainError> {
    u8::try_from(value)
        .map_err(|_| DomainError::Database(format!("match {} has score out of range", id)))
}

/// Convert SeaORM model to domain entity
impl TryFrom<matches::Model> for Match {
    type Error = DomainError;

    fn try_from(model: matches::Model) -> Result<Self, Self::Error> {
        let id = model.id;
        Ok(Match {
            id: MatchId(id),
            group_id: GroupId(model.group_id),
            created_at: model.created_at.with_timezone(&Utc),
            players: from_json::<[PlayerId; 4]>(id, "players", model.players)?,
            team_a: from_json::<[PlayerId; 2]>(id, "team_a", model.team_a)?,
            team_b: from_json::<[PlayerId; 2]>(id, "team_b", model.team_b)?,
            score_a: score(id, model.score_a)?,
            score_b: score(id, model.score_b)?,
            rating_deltas: RatingMap::from_json(model.rating_deltas),
            pre_match_ratings: RatingMap::from_json(model.pre_match_ratings),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at_second, player_id, test_group_id};

    fn model(players: serde_json::Value, score_a: i16) -> matches::Model {
        let [a, b, c, d] = [1, 2, 3, 4].map(player_id);
        matches::Model {
            id: Uuid::from_u128(7),
            group_id: test_group_id().0,
            created_at: at_second(5).fixed_offset(),
            players,
            team_a: serde_json::json!([a, b]),
            team_b: serde_json::json!([c, d]),
            score_a,
            score_b: 4,
            rating_deltas: serde_json::json!({ (a.to_string()): "0.1", (b.to_string()): 0.1 }),
            pre_match_ratings: serde_json::json!(null),
        }
    }

    #[test]
    fn model_converts_to_match() {
        let ids = [1, 2, 3, 4].map(player_id);
        let converted = Match::try_from(model(serde_json::json!(ids), 11)).unwrap();

        assert_eq!(converted.players, ids);
        assert_eq!(converted.team_b, [ids[2], ids[3]]);
        assert_eq!(converted.score_a, 11);
        assert_eq!(converted.rating_deltas.get(&ids[0]), Some(0.1));
        assert!(converted.pre_match_ratings.is_empty());
        assert_eq!(converted.created_at, at_second(5));
    }

    #[test]
    fn malformed_players_column_is_rejected() {
        let result = Match::try_from(model(serde_json::json!(["not-a-uuid"]), 11));
        assert!(matches!(result, Err(DomainError::Database(_))));
    }

    #[test]
    fn negative_score_is_rejected() {
        let ids = [1, 2, 3, 4].map(player_id);
        let result = Match::try_from(model(serde_json::json!(ids), -1));
        assert!(matches!(result, Err(DomainError::Database(_))));
    }
}
