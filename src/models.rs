use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{
    EntityKind, addresses, admin_log_entries, cart_items, carts, collections,
    customers::{self, Membership},
    order_items,
    orders::{self, PaymentStatus},
    products::{self, InventoryStatus},
    promotions, tagged_items, tags,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Collection {
    pub id: i32,
    pub title: String,
    pub featured_product_id: Option<i32>,
    /// Number of products filed under this collection.
    pub product_count: u64,
}

impl Collection {
    pub fn from_entity(model: collections::Model, product_count: u64) -> Self {
        Self {
            id: model.id,
            title: model.title,
            featured_product_id: model.featured_product_id,
            product_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "9.99")]
    pub unit_price: Decimal,
    pub inventory: i32,
    pub inventory_status: InventoryStatus,
    pub last_update: DateTime<Utc>,
    pub collection_id: i32,
    pub collection_title: String,
}

impl Product {
    pub fn from_entity(model: products::Model, collection_title: String) -> Self {
        Self {
            inventory_status: model.inventory_status(),
            id: model.id,
            title: model.title,
            slug: model.slug,
            description: model.description,
            unit_price: model.unit_price.round_dp(2),
            inventory: model.inventory,
            last_update: model.last_update.with_timezone(&Utc),
            collection_id: model.collection_id,
            collection_title,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Promotion {
    pub id: i32,
    pub description: String,
    pub discount: f64,
}

impl From<promotions::Model> for Promotion {
    fn from(model: promotions::Model) -> Self {
        Self {
            id: model.id,
            description: model.description,
            discount: model.discount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: Membership,
    pub order_count: u64,
}

impl Customer {
    pub fn from_entity(model: customers::Model, order_count: u64) -> Self {
        Self {
            full_name: model.full_name(),
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            birth_date: model.birth_date,
            membership: model.membership,
            order_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub customer_id: i32,
    pub street: String,
    pub city: String,
}

impl From<addresses::Model> for Address {
    fn from(model: addresses::Model) -> Self {
        Self {
            customer_id: model.customer_id,
            street: model.street,
            city: model.city,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub placed_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub customer_id: i32,
    pub customer_full_name: String,
}

impl Order {
    pub fn from_entity(model: orders::Model, customer_full_name: String) -> Self {
        Self {
            id: model.id,
            placed_at: model.placed_at.with_timezone(&Utc),
            payment_status: model.payment_status,
            customer_id: model.customer_id,
            customer_full_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i16,
    #[schema(value_type = String, example = "9.99")]
    pub unit_price: Decimal,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price.round_dp(2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<carts::Model> for Cart {
    fn from(model: carts::Model) -> Self {
        Self {
            id: model.id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i16,
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            id: model.id,
            cart_id: model.cart_id,
            product_id: model.product_id,
            quantity: model.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    pub id: i32,
    pub label: String,
}

impl From<tags::Model> for Tag {
    fn from(model: tags::Model) -> Self {
        Self {
            id: model.id,
            label: model.label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaggedItem {
    pub id: i32,
    pub tag_id: i32,
    pub tag_label: String,
    pub entity_kind: EntityKind,
    pub object_id: i32,
}

impl TaggedItem {
    pub fn from_entity(model: tagged_items::Model, tag_label: String) -> Self {
        Self {
            id: model.id,
            tag_id: model.tag_id,
            tag_label,
            entity_kind: model.entity_kind,
            object_id: model.object_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminLogEntry {
    pub id: i32,
    pub action_time: DateTime<Utc>,
    pub action_flag: admin_log_entries::ActionFlag,
    pub entity_kind: EntityKind,
    pub object_id: Option<i32>,
    pub object_repr: String,
    pub change_message: String,
}

impl From<admin_log_entries::Model> for AdminLogEntry {
    fn from(model: admin_log_entries::Model) -> Self {
        Self {
            id: model.id,
            action_time: model.action_time.with_timezone(&Utc),
            action_flag: model.action_flag,
            entity_kind: model.entity_kind,
            object_id: model.object_id,
            object_repr: model.object_repr,
            change_message: model.change_message,
        }
    }
}
