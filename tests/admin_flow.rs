mod common;

use std::collections::HashMap;

use common::{create_collection, create_customer, create_product, field_errors, price, setup_state};
use rust_decimal::Decimal;
use storefront_admin_api::{
    admin::AdminAction,
    dto::{
        admin::{ActionRequest, FieldUpdateRequest},
        orders::{CreateOrderRequest, OrderItemInput},
        tags::{CreateTagRequest, TagObjectRequest},
    },
    entity::{EntityKind, admin_log_entries::ActionFlag},
    error::AppError,
    services::{admin_service, product_service, tag_service},
    state::AppState,
};

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

async fn product_titles(state: &AppState, pairs: &[(&str, &str)]) -> anyhow::Result<Vec<String>> {
    let page = admin_service::changelist(state, EntityKind::Product, params(pairs))
        .await?
        .data
        .expect("changelist");
    Ok(page
        .rows
        .iter()
        .map(|row| row["title"].as_str().unwrap_or_default().to_owned())
        .collect())
}

#[tokio::test]
async fn site_index_lists_registered_entities() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let index = admin_service::site_index(&state).await?.data.expect("index");
    let kinds: Vec<_> = index.entities.iter().map(|e| e.entity).collect();
    assert_eq!(
        kinds,
        vec![
            EntityKind::Collection,
            EntityKind::Product,
            EntityKind::Customer,
            EntityKind::Order,
            EntityKind::Tag,
        ]
    );
    let product = &index.entities[1];
    assert!(product.searchable);
    assert_eq!(product.actions, vec![AdminAction::ClearInventory]);
    assert!(!index.entities[3].searchable);
    Ok(())
}

#[tokio::test]
async fn product_changelist_pages_projects_and_orders() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    for n in 1..=12 {
        create_product(&state, &format!("Book {n:02}"), "10.00", n, books.id).await?;
    }

    let first = admin_service::changelist(&state, EntityKind::Product, params(&[])).await?;
    assert_eq!(first.meta.as_ref().and_then(|m| m.total), Some(12));
    let page = first.data.expect("changelist");
    assert_eq!(page.rows.len(), 10);
    assert_eq!(page.editable, vec!["unit_price".to_owned()]);

    let row = page.rows[0].as_object().expect("row object");
    let mut keys: Vec<_> = row.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["collection_title", "id", "inventory_status", "title", "unit_price"]
    );
    assert_eq!(row["title"], "Book 01");
    assert_eq!(row["collection_title"], "Books");
    assert_eq!(row["inventory_status"], "LOW");

    let second = product_titles(&state, &[("page", "2")]).await?;
    assert_eq!(second, vec!["Book 11", "Book 12"]);

    // Inventory status sorts by the stored inventory.
    let by_stock = product_titles(&state, &[("o", "-inventory_status")]).await?;
    assert_eq!(by_stock[0], "Book 12");

    let err = admin_service::changelist(&state, EntityKind::Product, params(&[("o", "slug")]))
        .await
        .expect_err("slug is not a column");
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn changelist_search_and_filters() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let fiction = create_collection(&state, "Fiction").await?;
    let poetry = create_collection(&state, "Poetry").await?;
    create_product(&state, "Novel", "9.99", 5, fiction.id).await?;
    create_product(&state, "Novella", "7.99", 50, fiction.id).await?;
    create_product(&state, "Sonnets", "12.00", 2, poetry.id).await?;
    create_product(&state, "A Novel Idea", "8.00", 40, poetry.id).await?;

    // Prefix match only.
    let titles = product_titles(&state, &[("q", "nov")]).await?;
    assert_eq!(titles, vec!["Novel", "Novella"]);

    let poetry_id = poetry.id.to_string();
    let titles = product_titles(&state, &[("collection_id", poetry_id.as_str())]).await?;
    assert_eq!(titles, vec!["A Novel Idea", "Sonnets"]);

    let titles = product_titles(&state, &[("inventory", "1")]).await?;
    assert_eq!(titles, vec!["Novel", "Sonnets"]);

    let titles = product_titles(&state, &[("last_update", "today")]).await?;
    assert_eq!(titles.len(), 4);

    for bad in [
        [("colour", "red")],
        [("last_update", "yesterday")],
        [("collection_id", "poetry")],
    ] {
        let err = admin_service::changelist(&state, EntityKind::Product, params(&bad))
            .await
            .expect_err("bad filter");
        assert!(matches!(err, AppError::BadRequest(_)), "{bad:?}");
    }

    let collections = admin_service::changelist(&state, EntityKind::Collection, params(&[]))
        .await?
        .data
        .expect("changelist");
    let counts: Vec<_> = collections
        .rows
        .iter()
        .map(|row| (row["title"].clone(), row["product_count"].clone()))
        .collect();
    assert_eq!(
        counts,
        vec![
            (serde_json::json!("Fiction"), serde_json::json!(2)),
            (serde_json::json!("Poetry"), serde_json::json!(2)),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn list_editable_goes_through_validation() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;

    let row = admin_service::update_field(
        &state,
        EntityKind::Product,
        atlas.id,
        FieldUpdateRequest {
            field: "unit_price".into(),
            value: serde_json::json!("18.50"),
        },
    )
    .await?
    .data
    .expect("row");
    assert_eq!(row["id"], atlas.id);
    let stored = product_service::get_product(&state, atlas.id).await?.data.expect("product");
    assert_eq!(stored.product.unit_price, price("18.50"));

    let err = admin_service::update_field(
        &state,
        EntityKind::Product,
        atlas.id,
        FieldUpdateRequest {
            field: "unit_price".into(),
            value: serde_json::json!("0.10"),
        },
    )
    .await
    .expect_err("price below one");
    assert!(field_errors(err).contains("unit_price"));

    let err = admin_service::update_field(
        &state,
        EntityKind::Product,
        atlas.id,
        FieldUpdateRequest {
            field: "title".into(),
            value: serde_json::json!("Renamed"),
        },
    )
    .await
    .expect_err("title is not list editable");
    assert!(field_errors(err).contains("title"));

    let stored = product_service::get_product(&state, atlas.id).await?.data.expect("product");
    assert_eq!(stored.product.title, "Atlas");
    assert_eq!(stored.product.unit_price, Decimal::new(1850, 2));

    let ada = create_customer(&state, "Ada", "Lovelace", "ada@example.com").await?;
    let row = admin_service::update_field(
        &state,
        EntityKind::Customer,
        ada.id,
        FieldUpdateRequest {
            field: "membership".into(),
            value: serde_json::json!("Gold"),
        },
    )
    .await?
    .data
    .expect("row");
    assert_eq!(row["membership"], "Gold");
    Ok(())
}

#[tokio::test]
async fn clear_inventory_action_and_log() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let a = create_product(&state, "A", "5.00", 15, books.id).await?;
    let b = create_product(&state, "B", "5.00", 0, books.id).await?;

    let resp = admin_service::run_action(
        &state,
        EntityKind::Product,
        ActionRequest {
            action: "clear_inventory".into(),
            ids: vec![a.id, b.id],
        },
    )
    .await?;
    assert_eq!(resp.message, "2 products were successfully updated.");
    let result = resp.data.expect("result");
    assert_eq!(result.action, AdminAction::ClearInventory);
    assert_eq!(result.affected, 2);

    let recent = admin_service::recent_actions(&state, Some(1))
        .await?
        .data
        .expect("entries");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].action_flag, ActionFlag::Change);
    assert_eq!(recent[0].entity_kind, EntityKind::Product);
    assert_eq!(recent[0].object_id, None);

    let err = admin_service::run_action(
        &state,
        EntityKind::Product,
        ActionRequest {
            action: "clear_inventory".into(),
            ids: vec![],
        },
    )
    .await
    .expect_err("nothing selected");
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = admin_service::run_action(
        &state,
        EntityKind::Customer,
        ActionRequest {
            action: "clear_inventory".into(),
            ids: vec![1],
        },
    )
    .await
    .expect_err("customers have no such action");
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn autocomplete_needs_search_fields() -> anyhow::Result<()> {
    let state = setup_state().await?;
    create_collection(&state, "Fiction").await?;
    create_collection(&state, "Film").await?;
    create_collection(&state, "Poetry").await?;

    let found = admin_service::autocomplete(&state, EntityKind::Collection, Some("fi".into()))
        .await?
        .data
        .expect("items");
    let labels: Vec<_> = found.items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["Fiction", "Film"]);

    let everything = admin_service::autocomplete(&state, EntityKind::Collection, None)
        .await?
        .data
        .expect("items");
    assert_eq!(everything.items.len(), 3);

    let err = admin_service::autocomplete(&state, EntityKind::Order, Some("1".into()))
        .await
        .expect_err("orders have no search fields");
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn admin_order_form_enforces_inline_bounds() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;
    let ada = create_customer(&state, "Ada", "Lovelace", "ada@example.com").await?;

    let order = |count: usize| CreateOrderRequest {
        customer_id: ada.id,
        payment_status: None,
        items: vec![
            OrderItemInput {
                product_id: atlas.id,
                quantity: 1,
                unit_price: None,
            };
            count
        ],
    };

    for count in [0, 11] {
        let err = admin_service::create_order_with_items(&state, order(count))
            .await
            .expect_err("outside the inline bounds");
        let errors = field_errors(err);
        assert_eq!(
            errors.messages("items"),
            ["Please submit between 1 and 10 items.".to_owned()]
        );
    }

    let created = admin_service::create_order_with_items(&state, order(10))
        .await?
        .data
        .expect("order");
    assert_eq!(created.items.len(), 10);

    let view = admin_service::change_view(&state, EntityKind::Order, created.order.id)
        .await?
        .data
        .expect("change view");
    assert_eq!(view.object["customer_full_name"], "Ada Lovelace");
    assert_eq!(view.inlines.len(), 1);
    assert_eq!(view.inlines[0].config.entity, EntityKind::OrderItem);
    assert_eq!(view.inlines[0].rows.len(), 10);

    let orders = admin_service::changelist(&state, EntityKind::Order, params(&[]))
        .await?
        .data
        .expect("changelist");
    assert_eq!(orders.rows[0]["customer_full_name"], "Ada Lovelace");
    Ok(())
}

#[tokio::test]
async fn product_change_view_shows_tags_inline() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;
    let tag = tag_service::create_tag(&state, CreateTagRequest { label: "maps".into() })
        .await?
        .data
        .expect("tag");
    tag_service::tag_object(
        &state,
        TagObjectRequest {
            tag_id: tag.id,
            entity_kind: EntityKind::Product,
            object_id: atlas.id,
        },
    )
    .await?;

    let view = admin_service::change_view(&state, EntityKind::Product, atlas.id)
        .await?
        .data
        .expect("change view");
    assert_eq!(view.object["slug"], "atlas");
    let tags = view
        .inlines
        .iter()
        .find(|inline| inline.config.entity == EntityKind::TaggedItem)
        .expect("tag inline");
    assert_eq!(tags.rows.len(), 1);
    assert_eq!(tags.rows[0]["tag_label"], "maps");

    let found = admin_service::autocomplete(&state, EntityKind::Tag, Some("ma".into()))
        .await?
        .data
        .expect("items");
    assert_eq!(found.items[0].id, tag.id);

    let err = admin_service::change_view(&state, EntityKind::Product, 999)
        .await
        .expect_err("missing product");
    assert!(matches!(err, AppError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn changelist_survives_huge_page_numbers() -> anyhow::Result<()> {
    let state = setup_state().await?;
    create_customer(&state, "Ada", "Lovelace", "ada@example.com").await?;

    let page = u64::MAX.to_string();
    let resp = admin_service::changelist(&state, EntityKind::Customer, params(&[("page", page.as_str())]))
        .await?;
    assert_eq!(resp.meta.as_ref().and_then(|m| m.total), Some(1));
    assert!(resp.data.expect("changelist").rows.is_empty());

    let err = admin_service::changelist(&state, EntityKind::Customer, params(&[("page", "-1")]))
        .await
        .expect_err("negative page");
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn orders_sort_by_customer_first_name() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;
    let zoe = create_customer(&state, "Zoe", "Adams", "zoe@example.com").await?;
    let ada = create_customer(&state, "Ada", "Zed", "ada@example.com").await?;
    for customer_id in [zoe.id, ada.id] {
        admin_service::create_order_with_items(
            &state,
            CreateOrderRequest {
                customer_id,
                payment_status: None,
                items: vec![OrderItemInput {
                    product_id: atlas.id,
                    quantity: 1,
                    unit_price: None,
                }],
            },
        )
        .await?;
    }

    let names = |pairs: &'static [(&'static str, &'static str)]| {
        let state = state.clone();
        async move {
            let page = admin_service::changelist(&state, EntityKind::Order, params(pairs))
                .await?
                .data
                .expect("changelist");
            anyhow::Ok(
                page.rows
                    .iter()
                    .map(|row| row["customer_full_name"].as_str().unwrap_or_default().to_owned())
                    .collect::<Vec<_>>(),
            )
        }
    };

    assert_eq!(names(&[("o", "customer_full_name")]).await?, vec!["Ada Zed", "Zoe Adams"]);
    assert_eq!(names(&[("o", "-customer_full_name")]).await?, vec!["Zoe Adams", "Ada Zed"]);
    assert_eq!(
        names(&[("o", "customer_full_name,-customer_full_name")]).await?,
        vec!["Ada Zed", "Zoe Adams"]
    );
    Ok(())
}
