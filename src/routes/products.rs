use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};

use crate::{
    dto::products::{
        ClearInventoryRequest, ClearInventoryResult, CreateProductRequest, ProductDetail,
        ProductList, SetPromotionsRequest, UpdateProductRequest,
    },
    error::AppResult,
    models::{Product, Promotion},
    response::ApiResponse,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/clear-inventory", post(clear_inventory))
        .route(
            "/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/{id}/promotions", put(set_promotions))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ApiResponse<Product>),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product with its promotions and tags", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order items still reference the product"),
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/promotions",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = SetPromotionsRequest,
    responses(
        (status = 200, description = "Promotions of the product after the change", body = ApiResponse<Vec<Promotion>>),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Unknown promotion"),
    ),
    tag = "Products"
)]
pub async fn set_promotions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SetPromotionsRequest>,
) -> AppResult<Json<ApiResponse<Vec<Promotion>>>> {
    let resp = product_service::set_promotions(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/clear-inventory",
    request_body = ClearInventoryRequest,
    responses(
        (status = 200, description = "Number of products set to zero inventory", body = ApiResponse<ClearInventoryResult>)
    ),
    tag = "Products"
)]
pub async fn clear_inventory(
    State(state): State<AppState>,
    Json(payload): Json<ClearInventoryRequest>,
) -> AppResult<Json<ApiResponse<ClearInventoryResult>>> {
    let resp = product_service::clear_inventory(&state, payload).await?;
    Ok(Json(resp))
}
