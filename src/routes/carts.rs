use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};

use crate::{
    dto::carts::{AddCartItemRequest, CartWithItems, UpdateCartItemRequest},
    error::AppResult,
    models::CartItem,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_cart))
        .route("/{id}", get(get_cart).delete(delete_cart))
        .route("/{id}/items", post(add_cart_item))
        .route(
            "/{id}/items/{item_id}",
            patch(update_cart_item).delete(remove_cart_item),
        )
}

#[utoipa::path(
    post,
    path = "/api/carts",
    responses(
        (status = 200, description = "Empty cart created", body = ApiResponse<CartWithItems>)
    ),
    tag = "Carts"
)]
pub async fn create_cart(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CartWithItems>>> {
    let resp = cart_service::create_cart(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/carts/{id}",
    params(("id" = i32, Path, description = "Cart ID")),
    responses(
        (status = 200, description = "Cart with items", body = ApiResponse<CartWithItems>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Carts"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<CartWithItems>>> {
    let resp = cart_service::get_cart(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}",
    params(("id" = i32, Path, description = "Cart ID")),
    responses(
        (status = 200, description = "Cart and its items deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Carts"
)]
pub async fn delete_cart(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::delete_cart(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/items",
    params(("id" = i32, Path, description = "Cart ID")),
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Add or update cart item", body = ApiResponse<CartItem>),
        (status = 404, description = "Cart not found"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Carts"
)]
pub async fn add_cart_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::add_cart_item(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/carts/{id}/items/{item_id}",
    params(
        ("id" = i32, Path, description = "Cart ID"),
        ("item_id" = i32, Path, description = "Cart item ID"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity changed", body = ApiResponse<CartItem>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Carts"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i32, i32)>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::update_cart_item(&state, id, item_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}/items/{item_id}",
    params(
        ("id" = i32, Path, description = "Cart ID"),
        ("item_id" = i32, Path, description = "Cart item ID"),
    ),
    responses(
        (status = 200, description = "Removed from cart", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Carts"
)]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i32, i32)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::remove_cart_item(&state, id, item_id).await?;
    Ok(Json(resp))
}
