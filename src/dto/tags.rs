use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::EntityKind,
    models::{Tag, TaggedItem},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    pub label: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagObjectRequest {
    pub tag_id: i32,
    pub entity_kind: EntityKind,
    pub object_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TagList {
    pub items: Vec<Tag>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaggedItemList {
    pub items: Vec<TaggedItem>,
}
