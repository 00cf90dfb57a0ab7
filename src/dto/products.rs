use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, Promotion, TaggedItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    /// Derived from the title when omitted.
    pub slug: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = String, example = "9.99")]
    pub unit_price: Decimal,
    pub inventory: i32,
    pub collection_id: i32,
    #[serde(default)]
    pub promotion_ids: Vec<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[schema(value_type = Option<String>, example = "9.99")]
    pub unit_price: Option<Decimal>,
    pub inventory: Option<i32>,
    pub collection_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPromotionsRequest {
    pub promotion_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClearInventoryRequest {
    pub product_ids: Vec<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearInventoryResult {
    pub affected: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub promotions: Vec<Promotion>,
    pub tags: Vec<TaggedItem>,
}
