use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// At or below this many units a product is reported as running low.
pub const LOW_INVENTORY_THRESHOLD: i32 = 10;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub unit_price: Decimal,
    pub inventory: i32,
    pub last_update: DateTimeWithTimeZone,
    pub collection_id: i32,
}

impl Model {
    pub fn inventory_status(&self) -> InventoryStatus {
        InventoryStatus::from_inventory(self.inventory)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum InventoryStatus {
    Low,
    High,
}

impl InventoryStatus {
    pub fn from_inventory(inventory: i32) -> Self {
        if inventory > LOW_INVENTORY_THRESHOLD {
            InventoryStatus::High
        } else {
            InventoryStatus::Low
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::collections::Entity",
        from = "Column::CollectionId",
        to = "super::collections::Column::Id",
        on_delete = "Restrict"
    )]
    Collections,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::cart_items::Entity")]
    CartItems,
    #[sea_orm(has_many = "super::product_promotions::Entity")]
    ProductPromotions,
}

impl Related<super::collections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collections.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::cart_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::promotions::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_promotions::Relation::Promotions.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_promotions::Relation::Products.def().rev())
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        self.last_update = Set(Utc::now().into());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_status_boundary_is_ten() {
        assert_eq!(InventoryStatus::from_inventory(0), InventoryStatus::Low);
        assert_eq!(InventoryStatus::from_inventory(10), InventoryStatus::Low);
        assert_eq!(InventoryStatus::from_inventory(11), InventoryStatus::High);
    }

    #[test]
    fn inventory_status_serializes_uppercase() {
        let low = serde_json::to_value(InventoryStatus::Low).unwrap();
        let high = serde_json::to_value(InventoryStatus::High).unwrap();
        assert_eq!(low, "LOW");
        assert_eq!(high, "HIGH");
    }
}
