use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
    error::AppResult,
    models::Promotion,
    response::ApiResponse,
    routes::params::SearchQuery,
    services::promotion_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_promotions).post(create_promotion))
        .route(
            "/{id}",
            get(get_promotion)
                .patch(update_promotion)
                .delete(delete_promotion),
        )
}

#[utoipa::path(
    get,
    path = "/api/promotions",
    params(SearchQuery),
    responses(
        (status = 200, description = "List promotions", body = ApiResponse<PromotionList>)
    ),
    tag = "Promotions"
)]
pub async fn list_promotions(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<PromotionList>>> {
    let resp = promotion_service::list_promotions(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/promotions",
    request_body = CreatePromotionRequest,
    responses(
        (status = 200, description = "Promotion created", body = ApiResponse<Promotion>),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Promotions"
)]
pub async fn create_promotion(
    State(state): State<AppState>,
    Json(payload): Json<CreatePromotionRequest>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    let resp = promotion_service::create_promotion(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/promotions/{id}",
    params(("id" = i32, Path, description = "Promotion ID")),
    responses(
        (status = 200, description = "Promotion", body = ApiResponse<Promotion>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Promotions"
)]
pub async fn get_promotion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    let resp = promotion_service::get_promotion(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/promotions/{id}",
    params(("id" = i32, Path, description = "Promotion ID")),
    request_body = UpdatePromotionRequest,
    responses(
        (status = 200, description = "Promotion updated", body = ApiResponse<Promotion>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Promotions"
)]
pub async fn update_promotion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePromotionRequest>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    let resp = promotion_service::update_promotion(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/promotions/{id}",
    params(("id" = i32, Path, description = "Promotion ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Promotions"
)]
pub async fn delete_promotion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = promotion_service::delete_promotion(&state, id).await?;
    Ok(Json(resp))
}
