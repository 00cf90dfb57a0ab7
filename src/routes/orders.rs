use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};

use crate::{
    dto::orders::{
        CreateOrderRequest, OrderItemInput, OrderList, OrderWithItems, UpdateOrderItemRequest,
        UpdateOrderRequest,
    },
    error::AppResult,
    models::{Order, OrderItem},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/{id}",
            get(get_order).patch(update_order).delete(delete_order),
        )
        .route("/{id}/items", post(add_order_item))
        .route(
            "/{id}/items/{item_id}",
            patch(update_order_item).delete(delete_order_item),
        )
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "List orders", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created with its items", body = ApiResponse<OrderWithItems>),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::create_order(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<Order>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_order(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "The order still has items"),
    ),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/items",
    params(("id" = i32, Path, description = "Order ID")),
    request_body = OrderItemInput,
    responses(
        (status = 200, description = "Item added", body = ApiResponse<OrderItem>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Orders"
)]
pub async fn add_order_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<OrderItemInput>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = order_service::add_order_item(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/items/{item_id}",
    params(
        ("id" = i32, Path, description = "Order ID"),
        ("item_id" = i32, Path, description = "Order item ID"),
    ),
    request_body = UpdateOrderItemRequest,
    responses(
        (status = 200, description = "Quantity changed", body = ApiResponse<OrderItem>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Orders"
)]
pub async fn update_order_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i32, i32)>,
    Json(payload): Json<UpdateOrderItemRequest>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = order_service::update_order_item(&state, id, item_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}/items/{item_id}",
    params(
        ("id" = i32, Path, description = "Order ID"),
        ("item_id" = i32, Path, description = "Order item ID"),
    ),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Orders"
)]
pub async fn delete_order_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i32, i32)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order_item(&state, id, item_id).await?;
    Ok(Json(resp))
}
