mod common;

use std::time::Duration;

use common::{create_collection, create_customer, create_product, setup_state};
use sea_orm::{ActiveModelTrait, ActiveValue::{NotSet, Set}};
use storefront_admin_api::{
    dto::{
        orders::{CreateOrderRequest, OrderItemInput, UpdateOrderRequest},
        products::UpdateProductRequest,
    },
    entity::{carts, orders::PaymentStatus},
    services::{cart_service, order_service, product_service},
};

// Timestamps come from the clock, so give it a moment to move.
fn tick() {
    std::thread::sleep(Duration::from_millis(10));
}

#[tokio::test]
async fn product_last_update_advances_on_save() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;

    tick();
    product_service::update_product(
        &state,
        atlas.id,
        UpdateProductRequest {
            inventory: Some(3),
            ..Default::default()
        },
    )
    .await?;

    let stored = product_service::get_product(&state, atlas.id)
        .await?
        .data
        .expect("product")
        .product;
    assert_eq!(stored.inventory, 3);
    assert!(stored.last_update > atlas.last_update);
    Ok(())
}

#[tokio::test]
async fn order_placed_at_is_written_once() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;
    let ada = create_customer(&state, "Ada", "Lovelace", "ada@example.com").await?;

    let placed = order_service::create_order(
        &state,
        CreateOrderRequest {
            customer_id: ada.id,
            payment_status: None,
            items: vec![OrderItemInput {
                product_id: atlas.id,
                quantity: 1,
                unit_price: None,
            }],
        },
    )
    .await?
    .data
    .expect("order")
    .order;

    tick();
    order_service::update_order(
        &state,
        placed.id,
        UpdateOrderRequest {
            payment_status: Some(PaymentStatus::Complete),
            ..Default::default()
        },
    )
    .await?;

    let stored = order_service::get_order(&state, placed.id)
        .await?
        .data
        .expect("order")
        .order;
    assert_eq!(stored.payment_status, PaymentStatus::Complete);
    assert_eq!(stored.placed_at, placed.placed_at);
    Ok(())
}

#[tokio::test]
async fn cart_created_at_is_refreshed_on_save() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let cart = cart_service::create_cart(&state).await?.data.expect("cart").cart;

    tick();
    carts::ActiveModel {
        id: Set(cart.id),
        created_at: NotSet,
    }
    .update(&state.orm)
    .await?;

    let stored = cart_service::get_cart(&state, cart.id).await?.data.expect("cart").cart;
    assert!(stored.created_at > cart.created_at);
    Ok(())
}
