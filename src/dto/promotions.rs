use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Promotion;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePromotionRequest {
    pub description: String,
    pub discount: f64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePromotionRequest {
    pub description: Option<String>,
    pub discount: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromotionList {
    pub items: Vec<Promotion>,
}
