use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, ActiveValue::NotSet,
};

use crate::{
    audit,
    dto::collections::{CollectionList, CreateCollectionRequest, UpdateCollectionRequest},
    entity::{
        EntityKind,
        admin_log_entries::ActionFlag,
        collections::{ActiveModel, Column, Entity as Collections},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult, BlockingReference},
    models::Collection,
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    services::{contains, grouped_counts, referencing_ids, search_term, tag_service},
    state::AppState,
    validation::{FieldErrors, MAX_CHAR_LENGTH, check_text},
};

pub async fn list_collections(
    state: &AppState,
    query: SearchQuery,
) -> AppResult<ApiResponse<CollectionList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Collections::find();
    if let Some(search) = search_term(query.q.as_deref()) {
        finder = finder.filter(contains(Column::Title, search));
    }
    finder = finder.order_by_asc(Column::Title).order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await?;
    let models = finder.limit(limit).offset(offset).all(&state.orm).await?;

    let ids: Vec<i32> = models.iter().map(|c| c.id).collect();
    let counts = product_counts(&state.orm, &ids).await?;
    let items = models
        .into_iter()
        .map(|model| {
            let count = counts.get(&model.id).copied().unwrap_or(0);
            Collection::from_entity(model, count)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Collections", CollectionList { items }, Some(meta)))
}

/// Number of products per collection, in one grouped query.
pub async fn product_counts<C: ConnectionTrait>(
    db: &C,
    collection_ids: &[i32],
) -> AppResult<HashMap<i32, u64>> {
    Ok(grouped_counts::<Products, _>(db, ProdCol::CollectionId, collection_ids).await?)
}

pub async fn get_collection(state: &AppState, id: i32) -> AppResult<ApiResponse<Collection>> {
    let collection = Collections::find_by_id(id).one(&state.orm).await?;
    let collection = match collection {
        Some(c) => c,
        None => return Err(AppError::not_found(EntityKind::Collection, id)),
    };
    let count = product_counts(&state.orm, &[id])
        .await?
        .get(&id)
        .copied()
        .unwrap_or(0);
    Ok(ApiResponse::success(
        "Collection",
        Collection::from_entity(collection, count),
        None,
    ))
}

pub async fn create_collection(
    state: &AppState,
    payload: CreateCollectionRequest,
) -> AppResult<ApiResponse<Collection>> {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "title", &payload.title, MAX_CHAR_LENGTH);
    if let Some(product_id) = payload.featured_product_id {
        check_featured_product(&state.orm, &mut errors, product_id).await?;
    }
    errors.into_result()?;

    let collection = ActiveModel {
        id: NotSet,
        title: Set(payload.title.trim().to_owned()),
        featured_product_id: Set(payload.featured_product_id),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(collection_id = collection.id, "collection created");
    audit::record(
        state,
        ActionFlag::Addition,
        EntityKind::Collection,
        Some(collection.id),
        &collection.title,
        "Added.",
    )
    .await;

    Ok(ApiResponse::success(
        "Collection created",
        Collection::from_entity(collection, 0),
        Some(Meta::empty()),
    ))
}

pub async fn update_collection(
    state: &AppState,
    id: i32,
    payload: UpdateCollectionRequest,
) -> AppResult<ApiResponse<Collection>> {
    let existing = Collections::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::not_found(EntityKind::Collection, id)),
    };

    let mut errors = FieldErrors::new();
    if let Some(title) = &payload.title {
        check_text(&mut errors, "title", title, MAX_CHAR_LENGTH);
    }
    if let Some(Some(product_id)) = payload.featured_product_id {
        check_featured_product(&state.orm, &mut errors, product_id).await?;
    }
    errors.into_result()?;

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_owned());
    }
    if let Some(featured) = payload.featured_product_id {
        active.featured_product_id = Set(featured);
    }
    let collection = active.update(&state.orm).await?;

    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Collection,
        Some(collection.id),
        &collection.title,
        "Changed.",
    )
    .await;

    let count = product_counts(&state.orm, &[id])
        .await?
        .get(&id)
        .copied()
        .unwrap_or(0);
    Ok(ApiResponse::success(
        "Updated",
        Collection::from_entity(collection, count),
        Some(Meta::empty()),
    ))
}

/// Refused while any product is filed under the collection.
pub async fn delete_collection(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let collection = Collections::find_by_id(id).one(&txn).await?;
    let collection = match collection {
        Some(c) => c,
        None => return Err(AppError::not_found(EntityKind::Collection, id)),
    };

    let products = referencing_ids::<Products, _>(&txn, ProdCol::Id, ProdCol::CollectionId, id).await?;
    if !products.is_empty() {
        return Err(AppError::ReferentialIntegrity {
            entity: EntityKind::Collection,
            id,
            blocked_by: vec![BlockingReference {
                entity: EntityKind::Product,
                ids: products,
            }],
        });
    }

    tag_service::remove_tags_for(&txn, EntityKind::Collection, &[id]).await?;
    Collections::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(collection_id = id, "collection deleted");
    audit::record(
        state,
        ActionFlag::Deletion,
        EntityKind::Collection,
        Some(id),
        &collection.title,
        "Deleted.",
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn check_featured_product<C: ConnectionTrait>(
    db: &C,
    errors: &mut FieldErrors,
    product_id: i32,
) -> AppResult<()> {
    if Products::find_by_id(product_id).one(db).await?.is_none() {
        errors.add(
            "featured_product_id",
            format!("Product {product_id} does not exist."),
        );
    }
    Ok(())
}
