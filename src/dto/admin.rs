use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    admin::{AdminAction, InlineConfig, ListColumn, ListFilter},
    entity::EntityKind,
    models::AdminLogEntry,
};

/// One registered entity on the admin index page.
#[derive(Debug, Serialize, ToSchema)]
pub struct SiteEntry {
    pub entity: EntityKind,
    pub searchable: bool,
    pub actions: Vec<AdminAction>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SiteIndex {
    pub entities: Vec<SiteEntry>,
    pub recent_actions: Vec<AdminLogEntry>,
}

/// A page of the changelist. Each row carries `id` plus one value per column key.
#[derive(Debug, Serialize, ToSchema)]
pub struct Changelist {
    pub entity: EntityKind,
    pub columns: Vec<ListColumn>,
    pub editable: Vec<String>,
    pub filters: Vec<ListFilter>,
    pub actions: Vec<AdminAction>,
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InlineRows {
    #[serde(flatten)]
    pub config: InlineConfig,
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChangeView {
    pub entity: EntityKind,
    #[schema(value_type = Object)]
    pub object: serde_json::Value,
    pub inlines: Vec<InlineRows>,
}

/// New value for one `list_editable` field of a row.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FieldUpdateRequest {
    pub field: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActionRequest {
    pub action: String,
    pub ids: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResult {
    pub action: AdminAction,
    pub affected: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AutocompleteItem {
    pub id: i32,
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AutocompleteResults {
    pub items: Vec<AutocompleteItem>,
}
