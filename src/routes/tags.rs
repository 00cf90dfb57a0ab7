use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};

use crate::{
    dto::tags::{CreateTagRequest, TagList, TagObjectRequest, TaggedItemList},
    error::AppResult,
    models::{Tag, TaggedItem},
    response::ApiResponse,
    routes::params::{SearchQuery, TaggedItemQuery},
    services::tag_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", delete(delete_tag))
        .route("/tagged-items", get(list_tagged_items).post(tag_object))
        .route("/tagged-items/{id}", delete(untag))
}

#[utoipa::path(
    get,
    path = "/api/tags",
    params(SearchQuery),
    responses(
        (status = 200, description = "List tags", body = ApiResponse<TagList>)
    ),
    tag = "Tags"
)]
pub async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<TagList>>> {
    let resp = tag_service::list_tags(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = CreateTagRequest,
    responses(
        (status = 200, description = "Tag created", body = ApiResponse<Tag>),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Tags"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    Json(payload): Json<CreateTagRequest>,
) -> AppResult<Json<ApiResponse<Tag>>> {
    let resp = tag_service::create_tag(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(("id" = i32, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag and its associations deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Tags"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = tag_service::delete_tag(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tagged-items",
    params(TaggedItemQuery),
    responses(
        (status = 200, description = "Tags attached to one object", body = ApiResponse<TaggedItemList>)
    ),
    tag = "Tags"
)]
pub async fn list_tagged_items(
    State(state): State<AppState>,
    Query(query): Query<TaggedItemQuery>,
) -> AppResult<Json<ApiResponse<TaggedItemList>>> {
    let resp = tag_service::list_tagged_items(&state, query.entity_kind, query.object_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tagged-items",
    request_body = TagObjectRequest,
    responses(
        (status = 200, description = "Object tagged", body = ApiResponse<TaggedItem>),
        (status = 422, description = "Unknown tag or object"),
    ),
    tag = "Tags"
)]
pub async fn tag_object(
    State(state): State<AppState>,
    Json(payload): Json<TagObjectRequest>,
) -> AppResult<Json<ApiResponse<TaggedItem>>> {
    let resp = tag_service::tag_object(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/tagged-items/{id}",
    params(("id" = i32, Path, description = "Tagged item ID")),
    responses(
        (status = 200, description = "Removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Tags"
)]
pub async fn untag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = tag_service::untag(&state, id).await?;
    Ok(Json(resp))
}
