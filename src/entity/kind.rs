use std::fmt;

use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifies a table in the store schema.
///
/// Used as the "entity type" half of a generic reference (tagged items, admin log
/// entries) and to name the entities involved in integrity errors.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[sea_orm(string_value = "collection")]
    Collection,
    #[sea_orm(string_value = "product")]
    Product,
    #[sea_orm(string_value = "promotion")]
    Promotion,
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "address")]
    Address,
    #[sea_orm(string_value = "order")]
    Order,
    #[sea_orm(string_value = "order_item")]
    OrderItem,
    #[sea_orm(string_value = "cart")]
    Cart,
    #[sea_orm(string_value = "cart_item")]
    CartItem,
    #[sea_orm(string_value = "tag")]
    Tag,
    #[sea_orm(string_value = "tagged_item")]
    TaggedItem,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Collection => "collection",
            EntityKind::Product => "product",
            EntityKind::Promotion => "promotion",
            EntityKind::Customer => "customer",
            EntityKind::Address => "address",
            EntityKind::Order => "order",
            EntityKind::OrderItem => "order_item",
            EntityKind::Cart => "cart",
            EntityKind::CartItem => "cart_item",
            EntityKind::Tag => "tag",
            EntityKind::TaggedItem => "tagged_item",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
