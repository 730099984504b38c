//! PostgreSQL adapter for GroupRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::domain::entities::{Group, GroupCredentials, GroupId, NewGroup};
use crate::domain::ports::GroupRepository;
use crate::entity::groups;
use crate::error::DomainError;

/// PostgreSQL implementation of GroupRepository
pub struct PostgresGroupRepository {
    db: DatabaseConnection,
}

impl PostgresGroupRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model_by_slug(&self, slug: &str) -> Result<Option<groups::Model>, DomainError> {
        groups::Entity::find()
            .filter(groups::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

fn insert_error(slug: &str, err: DbErr) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::AlreadyExists(format!("group slug '{}'", slug))
        }
        _ => DomainError::Database(err.to_string()),
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        Ok(self.find_model_by_slug(slug).await?.map(|m| m.into()))
    }

    async fn find_credentials_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<GroupCredentials>, DomainError> {
        Ok(self.find_model_by_slug(slug).await?.map(|m| {
            let pin_hash = m.pin_hash.clone();
            GroupCredentials {
                group: m.into(),
                pin_hash,
            }
        }))
    }

    async fn create(&self, group: &NewGroup) -> Result<Group, DomainError> {
        let model = groups::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(group.name.clone()),
            slug: Set(group.slug.clone()),
            pin_hash: Set(group.pin_hash.clone()),
            created_at: Set(Some(Utc::now().fixed_offset())),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| insert_error(&group.slug, e))?;

        Ok(result.into())
    }
}

/// Convert SeaORM model to domain entity
impl From<groups::Model> for Group {
    fn from(model: groups::Model) -> Self {
        Group {
            id: GroupId(model.id),
            name: model.name,
            slug: model.slug,
            created_at: model
                .created_at
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now),
        }
    }
}
