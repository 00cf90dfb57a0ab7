//! Tags and the generic tagged-item association.
//!
//! A tagged item names its target as an `(EntityKind, id)` pair. [`object_exists`]
//! is the lookup from kind to table; it is the only place that needs to know which
//! kinds can be tagged.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, ActiveValue::NotSet,
};

use crate::{
    audit,
    dto::tags::{CreateTagRequest, TagList, TagObjectRequest, TaggedItemList},
    entity::{
        Addresses, CartItems, Carts, Collections, Customers, EntityKind, OrderItems, Orders,
        Products, Promotions,
        admin_log_entries::ActionFlag,
        tagged_items::{ActiveModel as TaggedActive, Column as TaggedCol, Entity as TaggedItems},
        tags::{ActiveModel as TagActive, Column as TagCol, Entity as Tags},
    },
    error::{AppError, AppResult},
    models::{Tag, TaggedItem},
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    services::{starts_with, search_term},
    state::AppState,
    validation::{FieldErrors, MAX_CHAR_LENGTH, check_text},
};

pub async fn list_tags(state: &AppState, query: SearchQuery) -> AppResult<ApiResponse<TagList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Tags::find();
    if let Some(search) = search_term(query.q.as_deref()) {
        finder = finder.filter(starts_with(TagCol::Label, search));
    }
    finder = finder.order_by_asc(TagCol::Label);

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Tag::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Tags", TagList { items }, Some(meta)))
}

pub async fn create_tag(state: &AppState, payload: CreateTagRequest) -> AppResult<ApiResponse<Tag>> {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "label", &payload.label, MAX_CHAR_LENGTH);
    errors.into_result()?;

    let tag = TagActive {
        id: NotSet,
        label: Set(payload.label.trim().to_owned()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(state, ActionFlag::Addition, EntityKind::Tag, Some(tag.id), &tag.label, "Added.").await;

    Ok(ApiResponse::success("Tag created", Tag::from(tag), Some(Meta::empty())))
}

/// Removes the tag and every association that uses it.
pub async fn delete_tag(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let tag = Tags::find_by_id(id).one(&txn).await?;
    let tag = match tag {
        Some(t) => t,
        None => return Err(AppError::not_found(EntityKind::Tag, id)),
    };

    TaggedItems::delete_many()
        .filter(TaggedCol::TagId.eq(id))
        .exec(&txn)
        .await?;
    Tags::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    audit::record(state, ActionFlag::Deletion, EntityKind::Tag, Some(id), &tag.label, "Deleted.").await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Attaches a tag to an object. Tagging the same object twice returns the existing
/// association.
pub async fn tag_object(
    state: &AppState,
    payload: TagObjectRequest,
) -> AppResult<ApiResponse<TaggedItem>> {
    let tag = Tags::find_by_id(payload.tag_id).one(&state.orm).await?;
    let mut errors = FieldErrors::new();
    if tag.is_none() {
        errors.add("tag_id", format!("Tag {} does not exist.", payload.tag_id));
    }
    if !object_exists(&state.orm, payload.entity_kind, payload.object_id).await? {
        errors.add(
            "object_id",
            format!("{} {} does not exist.", payload.entity_kind, payload.object_id),
        );
    }
    errors.into_result()?;
    let tag_label = tag.map(|t| t.label).unwrap_or_default();

    let existing = TaggedItems::find()
        .filter(
            Condition::all()
                .add(TaggedCol::TagId.eq(payload.tag_id))
                .add(TaggedCol::EntityKind.eq(payload.entity_kind))
                .add(TaggedCol::ObjectId.eq(payload.object_id)),
        )
        .one(&state.orm)
        .await?;
    if let Some(item) = existing {
        return Ok(ApiResponse::success(
            "Already tagged",
            TaggedItem::from_entity(item, tag_label),
            Some(Meta::empty()),
        ));
    }

    let item = TaggedActive {
        id: NotSet,
        tag_id: Set(payload.tag_id),
        entity_kind: Set(payload.entity_kind),
        object_id: Set(payload.object_id),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        ActionFlag::Change,
        item.entity_kind,
        Some(item.object_id),
        &format!("{} {}", item.entity_kind, item.object_id),
        &format!("Added tag \"{tag_label}\"."),
    )
    .await;

    Ok(ApiResponse::success(
        "Tagged",
        TaggedItem::from_entity(item, tag_label),
        Some(Meta::empty()),
    ))
}

pub async fn untag(state: &AppState, tagged_item_id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let item = TaggedItems::find_by_id(tagged_item_id).one(&state.orm).await?;
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::not_found(EntityKind::TaggedItem, tagged_item_id)),
    };
    TaggedItems::delete_by_id(tagged_item_id).exec(&state.orm).await?;

    audit::record(
        state,
        ActionFlag::Change,
        item.entity_kind,
        Some(item.object_id),
        &format!("{} {}", item.entity_kind, item.object_id),
        "Removed a tag.",
    )
    .await;

    Ok(ApiResponse::success(
        "Removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_tagged_items(
    state: &AppState,
    entity_kind: EntityKind,
    object_id: i32,
) -> AppResult<ApiResponse<TaggedItemList>> {
    let items = tagged_items_for(&state.orm, entity_kind, object_id).await?;
    Ok(ApiResponse::success("Tagged items", TaggedItemList { items }, None))
}

/// Tags attached to one object, with their labels, in two queries.
pub async fn tagged_items_for<C: ConnectionTrait>(
    db: &C,
    entity_kind: EntityKind,
    object_id: i32,
) -> AppResult<Vec<TaggedItem>> {
    let items = TaggedItems::find()
        .filter(TaggedCol::EntityKind.eq(entity_kind))
        .filter(TaggedCol::ObjectId.eq(object_id))
        .order_by_asc(TaggedCol::Id)
        .all(db)
        .await?;
    if items.is_empty() {
        return Ok(vec![]);
    }

    let labels: HashMap<i32, String> = Tags::find()
        .select_only()
        .column(TagCol::Id)
        .column(TagCol::Label)
        .filter(TagCol::Id.is_in(items.iter().map(|i| i.tag_id)))
        .into_tuple::<(i32, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(items
        .into_iter()
        .map(|item| {
            let label = labels.get(&item.tag_id).cloned().unwrap_or_default();
            TaggedItem::from_entity(item, label)
        })
        .collect())
}

/// Drops the associations of deleted objects. Called inside the deleting transaction.
pub async fn remove_tags_for<C: ConnectionTrait>(
    db: &C,
    entity_kind: EntityKind,
    object_ids: &[i32],
) -> AppResult<u64> {
    if object_ids.is_empty() {
        return Ok(0);
    }
    let result = TaggedItems::delete_many()
        .filter(TaggedCol::EntityKind.eq(entity_kind))
        .filter(TaggedCol::ObjectId.is_in(object_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Resolves a generic reference against the table its kind names.
pub async fn object_exists<C: ConnectionTrait>(
    db: &C,
    entity_kind: EntityKind,
    id: i32,
) -> AppResult<bool> {
    let found = match entity_kind {
        EntityKind::Collection => Collections::find_by_id(id).count(db).await?,
        EntityKind::Product => Products::find_by_id(id).count(db).await?,
        EntityKind::Promotion => Promotions::find_by_id(id).count(db).await?,
        EntityKind::Customer => Customers::find_by_id(id).count(db).await?,
        EntityKind::Address => Addresses::find_by_id(id).count(db).await?,
        EntityKind::Order => Orders::find_by_id(id).count(db).await?,
        EntityKind::OrderItem => OrderItems::find_by_id(id).count(db).await?,
        EntityKind::Cart => Carts::find_by_id(id).count(db).await?,
        EntityKind::CartItem => CartItems::find_by_id(id).count(db).await?,
        EntityKind::Tag => Tags::find_by_id(id).count(db).await?,
        EntityKind::TaggedItem => TaggedItems::find_by_id(id).count(db).await?,
    };
    Ok(found > 0)
}
