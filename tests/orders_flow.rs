mod common;

use common::{create_collection, create_customer, create_product, field_errors, price, setup_state};
use storefront_admin_api::{
    dto::{
        carts::{AddCartItemRequest, UpdateCartItemRequest},
        orders::{CreateOrderRequest, OrderItemInput, UpdateOrderItemRequest, UpdateOrderRequest},
        products::UpdateProductRequest,
    },
    entity::{EntityKind, orders::PaymentStatus},
    error::AppError,
    routes::params::OrderListQuery,
    services::{cart_service, customer_service, order_service, product_service},
};

// Integration flow: order placed with a captured price, the product is repriced,
// the order keeps what was paid.
#[tokio::test]
async fn order_items_keep_the_price_they_were_placed_at() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;
    let globe = create_product(&state, "Globe", "35.00", 5, books.id).await?;
    let ada = create_customer(&state, "Ada", "Lovelace", "ada@example.com").await?;

    let created = order_service::create_order(
        &state,
        CreateOrderRequest {
            customer_id: ada.id,
            payment_status: None,
            items: vec![
                OrderItemInput {
                    product_id: atlas.id,
                    quantity: 2,
                    unit_price: None,
                },
                OrderItemInput {
                    product_id: globe.id,
                    quantity: 1,
                    unit_price: Some(price("30.00")),
                },
            ],
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(created.order.payment_status, PaymentStatus::Pending);
    assert_eq!(created.order.customer_full_name, "Ada Lovelace");
    assert_eq!(created.items.len(), 2);
    assert_eq!(created.items[0].unit_price, price("20.00"));
    assert_eq!(created.items[1].unit_price, price("30.00"));

    product_service::update_product(
        &state,
        atlas.id,
        UpdateProductRequest {
            unit_price: Some(price("25.00")),
            ..Default::default()
        },
    )
    .await?;

    let item = order_service::update_order_item(
        &state,
        created.order.id,
        created.items[0].id,
        UpdateOrderItemRequest { quantity: 3 },
    )
    .await?
    .data
    .expect("item");
    assert_eq!(item.quantity, 3);
    assert_eq!(item.unit_price, price("20.00"));

    let fetched = order_service::get_order(&state, created.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(fetched.items[0].unit_price, price("20.00"));

    let customers = customer_service::get_customer(&state, ada.id).await?.data.expect("customer");
    assert_eq!(customers.order_count, 1);
    Ok(())
}

#[tokio::test]
async fn order_create_is_all_or_nothing() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;
    let ada = create_customer(&state, "Ada", "Lovelace", "ada@example.com").await?;

    let err = order_service::create_order(
        &state,
        CreateOrderRequest {
            customer_id: ada.id,
            payment_status: None,
            items: vec![
                OrderItemInput {
                    product_id: atlas.id,
                    quantity: 1,
                    unit_price: None,
                },
                OrderItemInput {
                    product_id: 999,
                    quantity: 0,
                    unit_price: None,
                },
            ],
        },
    )
    .await
    .expect_err("second item is invalid");
    let errors = field_errors(err);
    assert!(errors.contains("items[1].product_id"));
    assert!(errors.contains("items[1].quantity"));
    assert!(!errors.contains("items[0].product_id"));

    let orders = order_service::list_orders(&state, OrderListQuery::default()).await?;
    assert_eq!(orders.meta.and_then(|m| m.total), Some(0));

    let err = order_service::create_order(
        &state,
        CreateOrderRequest {
            customer_id: 77,
            payment_status: None,
            items: vec![],
        },
    )
    .await
    .expect_err("unknown customer");
    assert!(field_errors(err).contains("customer_id"));
    Ok(())
}

#[tokio::test]
async fn orders_with_items_and_customers_with_orders_are_protected() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;
    let ada = create_customer(&state, "Ada", "Lovelace", "ada@example.com").await?;

    let order = order_service::create_order(
        &state,
        CreateOrderRequest {
            customer_id: ada.id,
            payment_status: Some(PaymentStatus::Complete),
            items: vec![],
        },
    )
    .await?
    .data
    .expect("order");
    let item = order_service::add_order_item(
        &state,
        order.order.id,
        OrderItemInput {
            product_id: atlas.id,
            quantity: 1,
            unit_price: None,
        },
    )
    .await?
    .data
    .expect("item");

    let err = order_service::delete_order(&state, order.order.id)
        .await
        .expect_err("order has items");
    assert!(matches!(
        err,
        AppError::ReferentialIntegrity { entity: EntityKind::Order, .. }
    ));
    let err = customer_service::delete_customer(&state, ada.id)
        .await
        .expect_err("customer has orders");
    assert!(matches!(
        err,
        AppError::ReferentialIntegrity { entity: EntityKind::Customer, .. }
    ));

    order_service::delete_order_item(&state, order.order.id, item.id).await?;
    order_service::delete_order(&state, order.order.id).await?;
    customer_service::delete_customer(&state, ada.id).await?;
    Ok(())
}

#[tokio::test]
async fn order_list_filters_by_status() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let ada = create_customer(&state, "Ada", "Lovelace", "ada@example.com").await?;

    for status in [PaymentStatus::Pending, PaymentStatus::Failed, PaymentStatus::Pending] {
        order_service::create_order(
            &state,
            CreateOrderRequest {
                customer_id: ada.id,
                payment_status: Some(status),
                items: vec![],
            },
        )
        .await?;
    }

    let pending = order_service::list_orders(
        &state,
        OrderListQuery {
            payment_status: Some(PaymentStatus::Pending),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(pending.meta.and_then(|m| m.total), Some(2));

    let first = pending.data.expect("orders").items[0].id;
    let updated = order_service::update_order(
        &state,
        first,
        UpdateOrderRequest {
            customer_id: None,
            payment_status: Some(PaymentStatus::Complete),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(updated.payment_status, PaymentStatus::Complete);
    Ok(())
}

#[tokio::test]
async fn cart_items_follow_their_cart() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;

    let cart = cart_service::create_cart(&state).await?.data.expect("cart");
    assert!(cart.items.is_empty());
    let cart_id = cart.cart.id;

    let add = |quantity| AddCartItemRequest {
        product_id: atlas.id,
        quantity,
    };
    let first = cart_service::add_cart_item(&state, cart_id, add(2)).await?.data.expect("item");
    let second = cart_service::add_cart_item(&state, cart_id, add(5)).await?.data.expect("item");
    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 5);

    let err = cart_service::update_cart_item(
        &state,
        cart_id,
        first.id,
        UpdateCartItemRequest { quantity: 0 },
    )
    .await
    .expect_err("quantity below one");
    assert!(field_errors(err).contains("quantity"));

    let err = cart_service::add_cart_item(
        &state,
        cart_id,
        AddCartItemRequest {
            product_id: 4040,
            quantity: 1,
        },
    )
    .await
    .expect_err("unknown product");
    assert!(field_errors(err).contains("product_id"));

    cart_service::delete_cart(&state, cart_id).await?;
    let err = cart_service::get_cart(&state, cart_id).await.expect_err("cart gone");
    assert!(matches!(err, AppError::NotFound { entity: EntityKind::Cart, .. }));

    let err = cart_service::remove_cart_item(&state, cart_id, first.id)
        .await
        .expect_err("item went with the cart");
    assert!(matches!(err, AppError::NotFound { .. }));
    Ok(())
}
