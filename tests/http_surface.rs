mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::{create_collection, create_product, setup_state};
use serde_json::{Value, json};
use storefront_admin_api::{config::AppConfig, routes};
use tower::ServiceExt;

async fn test_app() -> anyhow::Result<(Router, storefront_admin_api::state::AppState)> {
    let state = setup_state().await?;
    let config = AppConfig::with_database_url("sqlite::memory:");
    Ok((routes::app(state.clone(), &config), state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json)?)
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body)?).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

#[tokio::test]
async fn health_carries_a_request_id() -> anyhow::Result<()> {
    let (app, _) = test_app().await?;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    Ok(())
}

#[tokio::test]
async fn unknown_route_uses_the_envelope() -> anyhow::Result<()> {
    let (app, _) = test_app().await?;
    let (status, body) = send(&app, Method::GET, "/api/nowhere", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["data"]["path"], "/api/nowhere");
    Ok(())
}

#[tokio::test]
async fn errors_map_to_status_codes() -> anyhow::Result<()> {
    let (app, state) = test_app().await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/collections",
        Some(json!({ "title": "Maps" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Maps");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/collections",
        Some(json!({ "title": "   " })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["data"]["details"]["title"].is_array());

    let books = create_collection(&state, "Books").await?;
    let novel = create_product(&state, "Novel", "9.99", 3, books.id).await?;
    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/collections/{}", books.id),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["data"]["details"]["blocked_by"],
        json!([{ "entity": "product", "ids": [novel.id] }])
    );

    let (status, _) = send(&app, Method::GET, "/api/products/4040", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/admin/product?colour=red", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn admin_changelist_over_http() -> anyhow::Result<()> {
    let (app, state) = test_app().await?;
    let books = create_collection(&state, "Books").await?;
    create_product(&state, "Atlas", "20.00", 50, books.id).await?;
    create_product(&state, "Almanac", "5.00", 2, books.id).await?;

    let (status, body) = send(&app, Method::GET, "/api/admin/product?inventory=1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "product");
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["total_pages"], 1);
    assert_eq!(body["data"]["rows"][0]["title"], "Almanac");
    assert_eq!(body["data"]["rows"][0]["inventory_status"], "LOW");
    Ok(())
}

#[tokio::test]
async fn unregistered_admin_kind_is_a_bad_request() -> anyhow::Result<()> {
    let (app, _) = test_app().await?;
    for uri in [
        "/api/admin/promotion",
        "/api/admin/promotion/1",
        "/api/admin/promotion/autocomplete?term=s",
    ] {
        let (status, body) = send(&app, Method::GET, uri, None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            body["message"],
            "Bad Request promotion is not registered in the admin",
            "{uri}"
        );
    }
    Ok(())
}
