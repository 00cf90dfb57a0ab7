mod common;

use common::{create_collection, create_product, field_errors, setup_state};
use storefront_admin_api::{
    dto::tags::{CreateTagRequest, TagObjectRequest},
    entity::EntityKind,
    routes::params::SearchQuery,
    services::{product_service, tag_service},
};

#[tokio::test]
async fn tags_attach_to_any_object_once() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;
    let atlas = create_product(&state, "Atlas", "20.00", 5, books.id).await?;

    let tag = tag_service::create_tag(
        &state,
        CreateTagRequest {
            label: "bestseller".into(),
        },
    )
    .await?
    .data
    .expect("tag");

    let request = |kind, object_id| TagObjectRequest {
        tag_id: tag.id,
        entity_kind: kind,
        object_id,
    };
    let first = tag_service::tag_object(&state, request(EntityKind::Product, atlas.id)).await?;
    assert_eq!(first.message, "Tagged");
    let again = tag_service::tag_object(&state, request(EntityKind::Product, atlas.id)).await?;
    assert_eq!(again.message, "Already tagged");
    assert_eq!(
        first.data.expect("item").id,
        again.data.expect("item").id
    );
    tag_service::tag_object(&state, request(EntityKind::Collection, books.id)).await?;

    let err = tag_service::tag_object(&state, request(EntityKind::Customer, 12))
        .await
        .expect_err("no such customer");
    assert!(field_errors(err).contains("object_id"));

    let detail = product_service::get_product(&state, atlas.id).await?.data.expect("product");
    assert_eq!(detail.tags.len(), 1);
    assert_eq!(detail.tags[0].tag_label, "bestseller");

    product_service::delete_product(&state, atlas.id).await?;
    let left = tag_service::list_tagged_items(&state, EntityKind::Product, atlas.id)
        .await?
        .data
        .expect("items");
    assert!(left.items.is_empty());

    let on_collection = tag_service::list_tagged_items(&state, EntityKind::Collection, books.id)
        .await?
        .data
        .expect("items");
    assert_eq!(on_collection.items.len(), 1);

    tag_service::delete_tag(&state, tag.id).await?;
    let on_collection = tag_service::list_tagged_items(&state, EntityKind::Collection, books.id)
        .await?
        .data
        .expect("items");
    assert!(on_collection.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn untag_and_search_labels() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let books = create_collection(&state, "Books").await?;

    let mut tags = vec![];
    for label in ["classic", "clearance", "new"] {
        let tag = tag_service::create_tag(&state, CreateTagRequest { label: label.into() })
            .await?
            .data
            .expect("tag");
        tags.push(tag);
    }

    let found = tag_service::list_tags(
        &state,
        SearchQuery {
            q: Some("CL".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("tags");
    let labels: Vec<_> = found.items.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["classic", "clearance"]);

    let item = tag_service::tag_object(
        &state,
        TagObjectRequest {
            tag_id: tags[2].id,
            entity_kind: EntityKind::Collection,
            object_id: books.id,
        },
    )
    .await?
    .data
    .expect("item");
    tag_service::untag(&state, item.id).await?;
    let left = tag_service::list_tagged_items(&state, EntityKind::Collection, books.id)
        .await?
        .data
        .expect("items");
    assert!(left.items.is_empty());

    let err = tag_service::create_tag(&state, CreateTagRequest { label: " ".into() })
        .await
        .expect_err("blank label");
    assert!(field_errors(err).contains("label"));
    Ok(())
}
