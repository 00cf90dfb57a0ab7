mod common;

use common::{create_collection, create_product, field_errors, price, product_request, setup_state};
use storefront_admin_api::{
    dto::{
        carts::AddCartItemRequest,
        collections::UpdateCollectionRequest,
        customers::CreateCustomerRequest,
        orders::{CreateOrderRequest, OrderItemInput},
        products::{ClearInventoryRequest, SetPromotionsRequest, UpdateProductRequest},
        promotions::{CreatePromotionRequest, UpdatePromotionRequest},
    },
    entity::{EntityKind, products::InventoryStatus},
    error::AppError,
    routes::params::{ProductQuery, SearchQuery},
    services::{
        cart_service, collection_service, customer_service, order_service, product_service,
        promotion_service,
    },
};

#[tokio::test]
async fn collection_cannot_be_deleted_while_it_has_products() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let fiction = create_collection(&state, "Fiction").await?;
    let novel = create_product(&state, "Novel", "9.99", 5, fiction.id).await?;
    assert_eq!(novel.slug, "novel");
    assert_eq!(novel.collection_title, "Fiction");

    let listed = collection_service::get_collection(&state, fiction.id).await?;
    assert_eq!(listed.data.expect("collection").product_count, 1);

    let err = collection_service::delete_collection(&state, fiction.id)
        .await
        .expect_err("collection still has products");
    match err {
        AppError::ReferentialIntegrity { entity, blocked_by, .. } => {
            assert_eq!(entity, EntityKind::Collection);
            assert_eq!(blocked_by[0].entity, EntityKind::Product);
            assert_eq!(blocked_by[0].ids, vec![novel.id]);
        }
        other => panic!("unexpected error {other:?}"),
    }

    product_service::delete_product(&state, novel.id).await?;
    collection_service::delete_collection(&state, fiction.id).await?;

    let err = collection_service::get_collection(&state, fiction.id)
        .await
        .expect_err("collection is gone");
    assert!(matches!(err, AppError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn rejected_price_update_leaves_product_unchanged() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let product = create_product(&state, "Atlas", "12.50", 3, books.id).await?;

    let err = product_service::update_product(
        &state,
        product.id,
        UpdateProductRequest {
            unit_price: Some(price("0.50")),
            ..Default::default()
        },
    )
    .await
    .expect_err("price below one");
    assert!(field_errors(err).contains("unit_price"));

    let stored = product_service::get_product(&state, product.id)
        .await?
        .data
        .expect("product");
    assert_eq!(stored.product.unit_price, price("12.50"));

    let updated = product_service::update_product(
        &state,
        product.id,
        UpdateProductRequest {
            unit_price: Some(price("1")),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("product");
    assert_eq!(updated.unit_price, price("1.00"));
    Ok(())
}

#[tokio::test]
async fn product_create_reports_every_invalid_field() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let mut request = product_request("  ", "0.999", -1, 404);
    request.slug = Some("not a slug".into());
    let err = product_service::create_product(&state, request)
        .await
        .expect_err("invalid product");
    let errors = field_errors(err);
    for field in ["title", "slug", "unit_price", "inventory", "collection_id"] {
        assert!(errors.contains(field), "{field} should be reported");
    }

    let listed = product_service::list_products(&state, ProductQuery::default()).await?;
    assert_eq!(listed.meta.and_then(|m| m.total), Some(0));
    Ok(())
}

#[tokio::test]
async fn inventory_status_switches_above_ten() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;

    let ten = create_product(&state, "Ten", "5.00", 10, books.id).await?;
    let eleven = create_product(&state, "Eleven", "5.00", 11, books.id).await?;
    assert_eq!(ten.inventory_status, InventoryStatus::Low);
    assert_eq!(eleven.inventory_status, InventoryStatus::High);
    Ok(())
}

#[tokio::test]
async fn clear_inventory_counts_products_already_at_zero() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let a = create_product(&state, "A", "5.00", 20, books.id).await?;
    let b = create_product(&state, "B", "5.00", 0, books.id).await?;
    let c = create_product(&state, "C", "5.00", 7, books.id).await?;

    let resp = product_service::clear_inventory(
        &state,
        ClearInventoryRequest {
            product_ids: vec![a.id, b.id, a.id, 9999],
        },
    )
    .await?;
    assert_eq!(resp.message, "2 products were successfully updated.");
    assert_eq!(resp.data.expect("result").affected, 2);

    for (id, expected) in [(a.id, 0), (b.id, 0), (c.id, 7)] {
        let product = product_service::get_product(&state, id).await?.data.expect("product");
        assert_eq!(product.product.inventory, expected);
    }
    Ok(())
}

#[tokio::test]
async fn product_delete_cleans_up_links_but_respects_orders() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let featured = create_product(&state, "Featured", "15.00", 4, books.id).await?;
    let ordered = create_product(&state, "Ordered", "8.00", 4, books.id).await?;

    collection_service::update_collection(
        &state,
        books.id,
        UpdateCollectionRequest {
            title: None,
            featured_product_id: Some(Some(featured.id)),
        },
    )
    .await?;

    let promotion = promotion_service::create_promotion(
        &state,
        CreatePromotionRequest {
            description: "Spring".into(),
            discount: 0.1,
        },
    )
    .await?
    .data
    .expect("promotion");
    product_service::set_promotions(
        &state,
        featured.id,
        SetPromotionsRequest {
            promotion_ids: vec![promotion.id],
        },
    )
    .await?;

    let cart = cart_service::create_cart(&state).await?.data.expect("cart");
    cart_service::add_cart_item(
        &state,
        cart.cart.id,
        AddCartItemRequest {
            product_id: featured.id,
            quantity: 2,
        },
    )
    .await?;

    product_service::delete_product(&state, featured.id).await?;

    let collection = collection_service::get_collection(&state, books.id)
        .await?
        .data
        .expect("collection");
    assert_eq!(collection.featured_product_id, None);
    let cart = cart_service::get_cart(&state, cart.cart.id).await?.data.expect("cart");
    assert!(cart.items.is_empty());
    // The promotion itself survives.
    promotion_service::get_promotion(&state, promotion.id).await?;

    let customer = customer_service::create_customer(
        &state,
        CreateCustomerRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
            birth_date: None,
            membership: None,
        },
    )
    .await?
    .data
    .expect("customer");
    order_service::create_order(
        &state,
        CreateOrderRequest {
            customer_id: customer.id,
            payment_status: None,
            items: vec![OrderItemInput {
                product_id: ordered.id,
                quantity: 1,
                unit_price: None,
            }],
        },
    )
    .await?;

    let err = product_service::delete_product(&state, ordered.id)
        .await
        .expect_err("ordered product is protected");
    assert!(matches!(
        err,
        AppError::ReferentialIntegrity { entity: EntityKind::Product, .. }
    ));
    Ok(())
}

#[tokio::test]
async fn promotions_are_replaced_as_a_set() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let product = create_product(&state, "Atlas", "20.00", 3, books.id).await?;

    let mut ids = vec![];
    for (description, discount) in [("Spring", 0.1), ("Summer", 0.25)] {
        let promotion = promotion_service::create_promotion(
            &state,
            CreatePromotionRequest {
                description: description.into(),
                discount,
            },
        )
        .await?
        .data
        .expect("promotion");
        ids.push(promotion.id);
    }

    let linked = product_service::set_promotions(
        &state,
        product.id,
        SetPromotionsRequest {
            promotion_ids: vec![ids[1], ids[0], ids[1]],
        },
    )
    .await?
    .data
    .expect("promotions");
    assert_eq!(linked.len(), 2);

    let linked = product_service::set_promotions(
        &state,
        product.id,
        SetPromotionsRequest {
            promotion_ids: vec![ids[1]],
        },
    )
    .await?
    .data
    .expect("promotions");
    assert_eq!(linked.iter().map(|p| p.id).collect::<Vec<_>>(), vec![ids[1]]);

    let err = product_service::set_promotions(
        &state,
        product.id,
        SetPromotionsRequest {
            promotion_ids: vec![4242],
        },
    )
    .await
    .expect_err("unknown promotion");
    assert!(field_errors(err).contains("promotion_ids"));

    promotion_service::delete_promotion(&state, ids[1]).await?;
    let detail = product_service::get_product(&state, product.id).await?.data.expect("product");
    assert!(detail.promotions.is_empty());
    Ok(())
}

#[tokio::test]
async fn promotion_discount_must_be_a_fraction() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let err = promotion_service::create_promotion(
        &state,
        CreatePromotionRequest {
            description: "Too good".into(),
            discount: 1.5,
        },
    )
    .await
    .expect_err("discount above one");
    assert!(field_errors(err).contains("discount"));

    let promotion = promotion_service::create_promotion(
        &state,
        CreatePromotionRequest {
            description: "Fair".into(),
            discount: 0.2,
        },
    )
    .await?
    .data
    .expect("promotion");
    let updated = promotion_service::update_promotion(
        &state,
        promotion.id,
        UpdatePromotionRequest {
            description: Some("Fairer".into()),
            discount: None,
        },
    )
    .await?
    .data
    .expect("promotion");
    assert_eq!(updated.description, "Fairer");
    assert_eq!(updated.discount, 0.2);

    let listed = promotion_service::list_promotions(
        &state,
        SearchQuery {
            q: Some("fair".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("promotions");
    assert_eq!(listed.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn product_search_and_collection_filter() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let fiction = create_collection(&state, "Fiction").await?;
    let poetry = create_collection(&state, "Poetry").await?;
    create_product(&state, "Great Novel", "9.99", 5, fiction.id).await?;
    create_product(&state, "Small Novel", "4.99", 5, poetry.id).await?;
    create_product(&state, "Odes", "14.99", 5, poetry.id).await?;

    let found = product_service::list_products(
        &state,
        ProductQuery {
            q: Some("NOVEL".into()),
            collection_id: Some(poetry.id),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("products");
    let titles: Vec<_> = found.items.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Small Novel"]);
    Ok(())
}
