use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::orders::PaymentStatus,
    models::{Order, OrderItem},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: i32,
    /// Pending when omitted.
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub product_id: i32,
    pub quantity: i32,
    /// Captured from the product's current price when omitted.
    #[schema(value_type = Option<String>, example = "9.99")]
    pub unit_price: Option<Decimal>,
}

/// `placed_at` is not updatable.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderRequest {
    pub customer_id: Option<i32>,
    pub payment_status: Option<PaymentStatus>,
}

/// Only the quantity of an order item can change; its price is a snapshot.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
