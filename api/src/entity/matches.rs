//! `matches` table
//!
//! Teams and rating maps are stored as JSON: `players`, `team_a` and
//! `team_b` hold arrays of player UUIDs, and `rating_deltas` and
//! `pre_match_ratings` hold `{player_id: number}` objects.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "JsonBinary")]
    pub players: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub team_a: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub team_b: Json,
    pub score_a: i16,
    pub score_b: i16,
    #[sea_orm(column_type = "JsonBinary")]
    pub rating_deltas: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub pre_match_ratings: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
