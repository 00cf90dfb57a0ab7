use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::collections::{CollectionList, CreateCollectionRequest, UpdateCollectionRequest},
    error::AppResult,
    models::Collection,
    response::ApiResponse,
    routes::params::SearchQuery,
    services::collection_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_collections).post(create_collection))
        .route(
            "/{id}",
            get(get_collection)
                .patch(update_collection)
                .delete(delete_collection),
        )
}

#[utoipa::path(
    get,
    path = "/api/collections",
    params(SearchQuery),
    responses(
        (status = 200, description = "List collections with their product counts", body = ApiResponse<CollectionList>)
    ),
    tag = "Collections"
)]
pub async fn list_collections(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<CollectionList>>> {
    let resp = collection_service::list_collections(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 200, description = "Collection created", body = ApiResponse<Collection>),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Collections"
)]
pub async fn create_collection(
    State(state): State<AppState>,
    Json(payload): Json<CreateCollectionRequest>,
) -> AppResult<Json<ApiResponse<Collection>>> {
    let resp = collection_service::create_collection(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    params(("id" = i32, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Collection", body = ApiResponse<Collection>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Collections"
)]
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Collection>>> {
    let resp = collection_service::get_collection(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/collections/{id}",
    params(("id" = i32, Path, description = "Collection ID")),
    request_body = UpdateCollectionRequest,
    responses(
        (status = 200, description = "Collection updated", body = ApiResponse<Collection>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Collections"
)]
pub async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCollectionRequest>,
) -> AppResult<Json<ApiResponse<Collection>>> {
    let resp = collection_service::update_collection(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    params(("id" = i32, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Products still belong to the collection"),
    ),
    tag = "Collections"
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = collection_service::delete_collection(&state, id).await?;
    Ok(Json(resp))
}
