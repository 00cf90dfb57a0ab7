use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    ActiveValue::NotSet,
    sea_query::Expr,
};

use crate::{
    audit,
    dto::products::{
        ClearInventoryRequest, ClearInventoryResult, CreateProductRequest, ProductDetail,
        ProductList, SetPromotionsRequest, UpdateProductRequest,
    },
    entity::{
        EntityKind,
        admin_log_entries::ActionFlag,
        cart_items::{Column as CartItemCol, Entity as CartItems},
        collections::{Column as CollectionCol, Entity as Collections},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        product_promotions::{
            ActiveModel as LinkActive, Column as LinkCol, Entity as ProductPromotions,
        },
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        promotions::{Column as PromotionCol, Entity as Promotions},
    },
    error::{AppError, AppResult, BlockingReference},
    models::{Product, Promotion},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::{contains, referencing_ids, search_term, tag_service},
    state::AppState,
    validation::{
        FieldErrors, MAX_CHAR_LENGTH, check_min_decimal, check_non_negative,
        check_price, check_slug, check_text, slugify,
    },
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = search_term(query.q.as_deref()) {
        condition = condition.add(contains(Column::Title, search));
    }

    if let Some(collection_id) = query.collection_id {
        condition = condition.add(Column::CollectionId.eq(collection_id));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::UnitPrice.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::UnitPrice.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::LastUpdate);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::Title => Column::Title,
        ProductSortBy::UnitPrice => Column::UnitPrice,
        ProductSortBy::Inventory => Column::Inventory,
        ProductSortBy::LastUpdate => Column::LastUpdate,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    finder = finder.order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await?;

    let items = finder
        .find_also_related(Collections)
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, collection)| {
            let title = collection.map(|c| c.title).unwrap_or_default();
            Product::from_entity(product, title)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<ApiResponse<ProductDetail>> {
    let result = Products::find_by_id(id)
        .find_also_related(Collections)
        .one(&state.orm)
        .await?;
    let (product, collection) = match result {
        Some(row) => row,
        None => return Err(AppError::not_found(EntityKind::Product, id)),
    };

    let promotions = product
        .find_related(Promotions)
        .order_by_asc(PromotionCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Promotion::from)
        .collect();
    let tags = tag_service::tagged_items_for(&state.orm, EntityKind::Product, id).await?;

    let title = collection.map(|c| c.title).unwrap_or_default();
    let detail = ProductDetail {
        product: Product::from_entity(product, title),
        promotions,
        tags,
    };
    Ok(ApiResponse::success("Product", detail, None))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let slug = payload
        .slug
        .as_deref()
        .map(|s| s.trim().to_owned())
        .unwrap_or_else(|| slugify(&payload.title));
    let description = payload
        .description
        .map(|d| d.trim().to_owned())
        .filter(|d| !d.is_empty());

    let mut errors = FieldErrors::new();
    check_fields(
        &mut errors,
        &payload.title,
        &slug,
        payload.unit_price,
        payload.inventory,
    );

    let txn = state.orm.begin().await?;
    let collection_title = collection_title(&txn, &mut errors, payload.collection_id).await?;
    let promotion_ids = check_promotions(&txn, &mut errors, &payload.promotion_ids).await?;
    errors.into_result()?;

    let product = ActiveModel {
        id: NotSet,
        title: Set(payload.title.trim().to_owned()),
        slug: Set(slug),
        description: Set(description),
        unit_price: Set(payload.unit_price),
        inventory: Set(payload.inventory),
        last_update: NotSet,
        collection_id: Set(payload.collection_id),
    }
    .insert(&txn)
    .await?;
    link_promotions(&txn, product.id, &promotion_ids).await?;
    txn.commit().await?;

    tracing::info!(product_id = product.id, "product created");
    audit::record(
        state,
        ActionFlag::Addition,
        EntityKind::Product,
        Some(product.id),
        &product.title,
        "Added.",
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        Product::from_entity(product, collection_title),
        Some(Meta::empty()),
    ))
}

/// Partial update. The merged row is validated as a whole before anything is written.
pub async fn update_product(
    state: &AppState,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::not_found(EntityKind::Product, id)),
    };

    let title = payload.title.clone().unwrap_or_else(|| existing.title.clone());
    let slug = payload
        .slug
        .as_deref()
        .map(|s| s.trim().to_owned())
        .unwrap_or_else(|| existing.slug.clone());
    let unit_price = payload
        .unit_price
        .unwrap_or_else(|| existing.unit_price.round_dp(2));
    let inventory = payload.inventory.unwrap_or(existing.inventory);
    let collection_id = payload.collection_id.unwrap_or(existing.collection_id);

    let mut errors = FieldErrors::new();
    check_fields(&mut errors, &title, &slug, unit_price, inventory);
    let collection_title = collection_title(&state.orm, &mut errors, collection_id).await?;
    errors.into_result()?;

    let mut active: ActiveModel = existing.into();
    active.title = Set(title.trim().to_owned());
    active.slug = Set(slug);
    if let Some(description) = payload.description {
        active.description = Set(description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty()));
    }
    active.unit_price = Set(unit_price);
    active.inventory = Set(inventory);
    active.collection_id = Set(collection_id);

    let product = active.update(&state.orm).await?;

    tracing::info!(product_id = product.id, "product updated");
    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Product,
        Some(product.id),
        &product.title,
        "Changed.",
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from_entity(product, collection_title),
        Some(Meta::empty()),
    ))
}

/// Refused while order items reference the product. Otherwise cart items, promotion
/// links and tags go with it, and collections featuring it lose their featured product.
pub async fn delete_product(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let product = Products::find_by_id(id).one(&txn).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::not_found(EntityKind::Product, id)),
    };

    let order_items =
        referencing_ids::<OrderItems, _>(&txn, OrderItemCol::Id, OrderItemCol::ProductId, id)
            .await?;
    if !order_items.is_empty() {
        return Err(AppError::ReferentialIntegrity {
            entity: EntityKind::Product,
            id,
            blocked_by: vec![BlockingReference {
                entity: EntityKind::OrderItem,
                ids: order_items,
            }],
        });
    }

    Collections::update_many()
        .col_expr(
            CollectionCol::FeaturedProductId,
            Expr::value(Option::<i32>::None),
        )
        .filter(CollectionCol::FeaturedProductId.eq(id))
        .exec(&txn)
        .await?;
    CartItems::delete_many()
        .filter(CartItemCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    ProductPromotions::delete_many()
        .filter(LinkCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    tag_service::remove_tags_for(&txn, EntityKind::Product, &[id]).await?;
    Products::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(product_id = id, "product deleted");
    audit::record(
        state,
        ActionFlag::Deletion,
        EntityKind::Product,
        Some(id),
        &product.title,
        "Deleted.",
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Replaces the product's promotions with exactly the given set.
pub async fn set_promotions(
    state: &AppState,
    id: i32,
    payload: SetPromotionsRequest,
) -> AppResult<ApiResponse<Vec<Promotion>>> {
    let txn = state.orm.begin().await?;

    let product = Products::find_by_id(id).one(&txn).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::not_found(EntityKind::Product, id)),
    };

    let mut errors = FieldErrors::new();
    let promotion_ids = check_promotions(&txn, &mut errors, &payload.promotion_ids).await?;
    errors.into_result()?;

    ProductPromotions::delete_many()
        .filter(LinkCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    link_promotions(&txn, id, &promotion_ids).await?;

    let promotions = product
        .find_related(Promotions)
        .order_by_asc(PromotionCol::Id)
        .all(&txn)
        .await?
        .into_iter()
        .map(Promotion::from)
        .collect();
    txn.commit().await?;

    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Product,
        Some(id),
        &product.title,
        "Changed promotions.",
    )
    .await;

    Ok(ApiResponse::success("Promotions", promotions, Some(Meta::empty())))
}

/// Sets the inventory of every listed product to zero with a single statement.
/// The reported count includes products that were already at zero.
pub async fn clear_inventory(
    state: &AppState,
    payload: ClearInventoryRequest,
) -> AppResult<ApiResponse<ClearInventoryResult>> {
    let ids: BTreeSet<i32> = payload.product_ids.into_iter().collect();
    let affected = if ids.is_empty() {
        0
    } else {
        Products::update_many()
            .col_expr(Column::Inventory, Expr::value(0))
            .filter(Column::Id.is_in(ids))
            .exec(&state.orm)
            .await?
            .rows_affected
    };

    let message = format!("{affected} products were successfully updated.");
    tracing::info!(affected, "inventory cleared");
    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Product,
        None,
        "clear_inventory",
        &message,
    )
    .await;

    Ok(ApiResponse::success(
        message,
        ClearInventoryResult { affected },
        Some(Meta::empty()),
    ))
}

/// Titles of the collections the given products belong to, keyed by product id.
pub(crate) async fn collection_titles<C: ConnectionTrait>(
    db: &C,
    products: &[ProductModel],
) -> AppResult<HashMap<i32, String>> {
    let collection_ids: BTreeSet<i32> = products.iter().map(|p| p.collection_id).collect();
    if collection_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let titles: HashMap<i32, String> = Collections::find()
        .select_only()
        .column(CollectionCol::Id)
        .column(CollectionCol::Title)
        .filter(CollectionCol::Id.is_in(collection_ids))
        .into_tuple::<(i32, String)>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    Ok(products
        .iter()
        .map(|p| (p.id, titles.get(&p.collection_id).cloned().unwrap_or_default()))
        .collect())
}

fn check_fields(
    errors: &mut FieldErrors,
    title: &str,
    slug: &str,
    unit_price: Decimal,
    inventory: i32,
) {
    check_text(errors, "title", title, MAX_CHAR_LENGTH);
    if slug.is_empty() {
        errors.add("slug", "This field may not be blank.");
    } else {
        check_slug(errors, "slug", slug);
    }
    check_price(errors, "unit_price", unit_price);
    check_min_decimal(errors, "unit_price", unit_price, Decimal::ONE);
    check_non_negative(errors, "inventory", inventory);
}

async fn collection_title<C: ConnectionTrait>(
    db: &C,
    errors: &mut FieldErrors,
    collection_id: i32,
) -> AppResult<String> {
    match Collections::find_by_id(collection_id).one(db).await? {
        Some(collection) => Ok(collection.title),
        None => {
            errors.add(
                "collection_id",
                format!("Collection {collection_id} does not exist."),
            );
            Ok(String::new())
        }
    }
}

/// Deduplicates the ids and reports the ones with no promotion behind them.
async fn check_promotions<C: ConnectionTrait>(
    db: &C,
    errors: &mut FieldErrors,
    promotion_ids: &[i32],
) -> AppResult<Vec<i32>> {
    let wanted: BTreeSet<i32> = promotion_ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(vec![]);
    }
    let found: BTreeSet<i32> = Promotions::find()
        .select_only()
        .column(PromotionCol::Id)
        .filter(PromotionCol::Id.is_in(wanted.iter().copied()))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    for missing in wanted.difference(&found) {
        errors.add(
            "promotion_ids",
            format!("Promotion {missing} does not exist."),
        );
    }
    Ok(wanted.into_iter().collect())
}

async fn link_promotions(
    txn: &DatabaseTransaction,
    product_id: i32,
    promotion_ids: &[i32],
) -> AppResult<()> {
    if promotion_ids.is_empty() {
        return Ok(());
    }
    let links = promotion_ids.iter().map(|&promotion_id| LinkActive {
        product_id: Set(product_id),
        promotion_id: Set(promotion_id),
    });
    ProductPromotions::insert_many(links)
        .exec_without_returning(txn)
        .await?;
    Ok(())
}
