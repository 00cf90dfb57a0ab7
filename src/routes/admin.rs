use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use crate::{
    dto::{
        admin::{
            ActionRequest, ActionResult, AutocompleteResults, ChangeView, Changelist,
            FieldUpdateRequest, SiteIndex,
        },
        orders::{CreateOrderRequest, OrderWithItems},
    },
    entity::EntityKind,
    error::AppResult,
    models::AdminLogEntry,
    response::ApiResponse,
    routes::params::{AutocompleteQuery, ChangelistQuery, RecentActionsQuery},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(site_index))
        .route("/recent-actions", get(recent_actions))
        .route("/order/with-items", post(create_order_with_items))
        .route("/{kind}", get(changelist))
        .route("/{kind}/actions", post(run_action))
        .route("/{kind}/autocomplete", get(autocomplete))
        .route("/{kind}/{id}", get(change_view).patch(update_field))
}

#[utoipa::path(
    get,
    path = "/api/admin",
    responses(
        (status = 200, description = "Registered entities and recent actions", body = ApiResponse<SiteIndex>)
    ),
    tag = "Admin"
)]
pub async fn site_index(State(state): State<AppState>) -> AppResult<Json<ApiResponse<SiteIndex>>> {
    let resp = admin_service::site_index(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/recent-actions",
    params(RecentActionsQuery),
    responses(
        (status = 200, description = "Newest log entries first", body = ApiResponse<Vec<AdminLogEntry>>)
    ),
    tag = "Admin"
)]
pub async fn recent_actions(
    State(state): State<AppState>,
    Query(query): Query<RecentActionsQuery>,
) -> AppResult<Json<ApiResponse<Vec<AdminLogEntry>>>> {
    let resp = admin_service::recent_actions(&state, query.limit).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/{kind}",
    params(
        ("kind" = EntityKind, Path, description = "Registered entity"),
        ChangelistQuery,
    ),
    responses(
        (status = 200, description = "One page of the changelist", body = ApiResponse<Changelist>),
        (status = 400, description = "Entity not registered, unknown filter or malformed value"),
    ),
    tag = "Admin"
)]
pub async fn changelist(
    State(state): State<AppState>,
    Path(kind): Path<EntityKind>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ApiResponse<Changelist>>> {
    let resp = admin_service::changelist(&state, kind, params).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/{kind}/{id}",
    params(
        ("kind" = EntityKind, Path, description = "Registered entity"),
        ("id" = i32, Path, description = "Object ID"),
    ),
    responses(
        (status = 200, description = "Object with its inline rows", body = ApiResponse<ChangeView>),
        (status = 400, description = "Entity not registered"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Admin"
)]
pub async fn change_view(
    State(state): State<AppState>,
    Path((kind, id)): Path<(EntityKind, i32)>,
) -> AppResult<Json<ApiResponse<ChangeView>>> {
    let resp = admin_service::change_view(&state, kind, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/{kind}/{id}",
    params(
        ("kind" = EntityKind, Path, description = "Registered entity"),
        ("id" = i32, Path, description = "Object ID"),
    ),
    request_body = FieldUpdateRequest,
    responses(
        (status = 200, description = "Row after the edit", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Entity not registered"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Field not editable or value rejected"),
    ),
    tag = "Admin"
)]
pub async fn update_field(
    State(state): State<AppState>,
    Path((kind, id)): Path<(EntityKind, i32)>,
    Json(payload): Json<FieldUpdateRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::update_field(&state, kind, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/{kind}/actions",
    params(("kind" = EntityKind, Path, description = "Registered entity")),
    request_body = ActionRequest,
    responses(
        (status = 200, description = "Action applied to the selection", body = ApiResponse<ActionResult>),
        (status = 400, description = "Entity not registered, unknown action or empty selection"),
    ),
    tag = "Admin"
)]
pub async fn run_action(
    State(state): State<AppState>,
    Path(kind): Path<EntityKind>,
    Json(payload): Json<ActionRequest>,
) -> AppResult<Json<ApiResponse<ActionResult>>> {
    let resp = admin_service::run_action(&state, kind, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/{kind}/autocomplete",
    params(
        ("kind" = EntityKind, Path, description = "Registered entity"),
        AutocompleteQuery,
    ),
    responses(
        (status = 200, description = "Matching objects", body = ApiResponse<AutocompleteResults>),
        (status = 400, description = "Entity not registered or without search fields"),
    ),
    tag = "Admin"
)]
pub async fn autocomplete(
    State(state): State<AppState>,
    Path(kind): Path<EntityKind>,
    Query(query): Query<AutocompleteQuery>,
) -> AppResult<Json<ApiResponse<AutocompleteResults>>> {
    let resp = admin_service::autocomplete(&state, kind, query.term).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/order/with-items",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created with its inline items", body = ApiResponse<OrderWithItems>),
        (status = 422, description = "Item count outside the inline bounds"),
    ),
    tag = "Admin"
)]
pub async fn create_order_with_items(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = admin_service::create_order_with_items(&state, payload).await?;
    Ok(Json(resp))
}
