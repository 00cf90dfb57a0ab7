#![allow(dead_code)]

use rust_decimal::Decimal;
use storefront_admin_api::{
    db::{create_orm_conn, run_migrations},
    dto::{
        collections::CreateCollectionRequest, customers::CreateCustomerRequest,
        products::CreateProductRequest,
    },
    error::AppError,
    models::{Collection, Customer, Product},
    services::{collection_service, customer_service, product_service},
    state::AppState,
    validation::FieldErrors,
};

/// Fresh in-memory database with every migration applied.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let orm = create_orm_conn("sqlite::memory:").await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm))
}

pub fn price(value: &str) -> Decimal {
    value.parse().expect("decimal literal")
}

pub async fn create_collection(state: &AppState, title: &str) -> anyhow::Result<Collection> {
    let resp = collection_service::create_collection(
        state,
        CreateCollectionRequest {
            title: title.into(),
            featured_product_id: None,
        },
    )
    .await?;
    Ok(resp.data.expect("collection"))
}

pub fn product_request(title: &str, unit_price: &str, inventory: i32, collection_id: i32) -> CreateProductRequest {
    CreateProductRequest {
        title: title.into(),
        slug: None,
        description: None,
        unit_price: price(unit_price),
        inventory,
        collection_id,
        promotion_ids: vec![],
    }
}

pub async fn create_product(
    state: &AppState,
    title: &str,
    unit_price: &str,
    inventory: i32,
    collection_id: i32,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(
        state,
        product_request(title, unit_price, inventory, collection_id),
    )
    .await?;
    Ok(resp.data.expect("product"))
}

pub fn customer_request(first_name: &str, last_name: &str, email: &str) -> CreateCustomerRequest {
    CreateCustomerRequest {
        first_name: first_name.into(),
        last_name: last_name.into(),
        email: email.into(),
        phone: "555-0100".into(),
        birth_date: None,
        membership: None,
    }
}

pub async fn create_customer(
    state: &AppState,
    first_name: &str,
    last_name: &str,
    email: &str,
) -> anyhow::Result<Customer> {
    let resp =
        customer_service::create_customer(state, customer_request(first_name, last_name, email))
            .await?;
    Ok(resp.data.expect("customer"))
}

/// Field errors carried by a validation failure.
pub fn field_errors(err: AppError) -> FieldErrors {
    match err {
        AppError::Validation(errors) => errors,
        other => panic!("expected a validation error, got {other:?}"),
    }
}
