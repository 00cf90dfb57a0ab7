use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::kind::EntityKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_log_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub action_time: DateTimeWithTimeZone,
    pub action_flag: ActionFlag,
    pub entity_kind: EntityKind,
    pub object_id: Option<i32>,
    pub object_repr: String,
    #[sea_orm(column_type = "Text")]
    pub change_message: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ActionFlag {
    #[sea_orm(string_value = "addition")]
    Addition,
    #[sea_orm(string_value = "change")]
    Change,
    #[sea_orm(string_value = "deletion")]
    Deletion,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            self.action_time = Set(Utc::now().into());
        }
        Ok(self)
    }
}
