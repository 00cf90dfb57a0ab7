use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Collection;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCollectionRequest {
    pub title: String,
    pub featured_product_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCollectionRequest {
    pub title: Option<String>,
    /// `null` clears the featured product.
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i32>)]
    pub featured_product_id: Option<Option<i32>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionList {
    pub items: Vec<Collection>,
}
