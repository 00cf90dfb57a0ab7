use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, ActiveValue::NotSet,
};

use crate::{
    audit,
    dto::carts::{AddCartItemRequest, CartWithItems, UpdateCartItemRequest},
    entity::{
        EntityKind,
        admin_log_entries::ActionFlag,
        cart_items::{ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems},
        carts::{ActiveModel as CartActive, Entity as Carts},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    models::{Cart, CartItem},
    response::{ApiResponse, Meta},
    services::tag_service,
    state::AppState,
    validation::{FieldErrors, check_quantity},
};

pub async fn create_cart(state: &AppState) -> AppResult<ApiResponse<CartWithItems>> {
    let cart = CartActive {
        id: NotSet,
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(cart_id = cart.id, "cart created");
    audit::record(
        state,
        ActionFlag::Addition,
        EntityKind::Cart,
        Some(cart.id),
        &format!("Cart {}", cart.id),
        "Added.",
    )
    .await;

    Ok(ApiResponse::success(
        "Cart created",
        CartWithItems {
            cart: Cart::from(cart),
            items: vec![],
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_cart(state: &AppState, id: i32) -> AppResult<ApiResponse<CartWithItems>> {
    let cart = Carts::find_by_id(id).one(&state.orm).await?;
    let cart = match cart {
        Some(c) => c,
        None => return Err(AppError::not_found(EntityKind::Cart, id)),
    };

    let items = CartItems::find()
        .filter(CartItemCol::CartId.eq(id))
        .order_by_asc(CartItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(CartItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        CartWithItems {
            cart: Cart::from(cart),
            items,
        },
        None,
    ))
}

/// Deletes the cart together with all of its items.
pub async fn delete_cart(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    if Carts::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::not_found(EntityKind::Cart, id));
    }

    let removed = CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    tag_service::remove_tags_for(&txn, EntityKind::Cart, &[id]).await?;
    Carts::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(cart_id = id, items = removed, "cart deleted");
    audit::record(
        state,
        ActionFlag::Deletion,
        EntityKind::Cart,
        Some(id),
        &format!("Cart {id}"),
        "Deleted.",
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Adding a product the cart already holds sets that item's quantity.
pub async fn add_cart_item(
    state: &AppState,
    cart_id: i32,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let mut errors = FieldErrors::new();
    let quantity = check_quantity(&mut errors, "quantity", payload.quantity);
    errors.into_result()?;

    let txn = state.orm.begin().await?;
    ensure_cart(&txn, cart_id).await?;
    if Products::find_by_id(payload.product_id).one(&txn).await?.is_none() {
        return Err(FieldErrors::single(
            "product_id",
            format!("Product {} does not exist.", payload.product_id),
        ));
    }

    let exist = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .filter(CartItemCol::ProductId.eq(payload.product_id))
        .one(&txn)
        .await?;

    let cart_item = if let Some(item) = exist {
        let mut active: CartItemActive = item.into();
        active.quantity = Set(quantity);
        active.update(&txn).await?
    } else {
        CartItemActive {
            id: NotSet,
            cart_id: Set(cart_id),
            product_id: Set(payload.product_id),
            quantity: Set(quantity),
        }
        .insert(&txn)
        .await?
    };
    txn.commit().await?;

    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Cart,
        Some(cart_id),
        &format!("Cart {cart_id}"),
        &format!("Set product {} to {}.", payload.product_id, quantity),
    )
    .await;

    Ok(ApiResponse::success("OK", CartItem::from(cart_item), None))
}

pub async fn update_cart_item(
    state: &AppState,
    cart_id: i32,
    item_id: i32,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let item = find_item(&state.orm, cart_id, item_id).await?;

    let mut errors = FieldErrors::new();
    let quantity = check_quantity(&mut errors, "quantity", payload.quantity);
    errors.into_result()?;

    let mut active: CartItemActive = item.into();
    active.quantity = Set(quantity);
    let item = active.update(&state.orm).await?;

    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Cart,
        Some(cart_id),
        &format!("Cart {cart_id}"),
        &format!("Changed quantity of cart item {item_id}."),
    )
    .await;

    Ok(ApiResponse::success("Updated", CartItem::from(item), None))
}

pub async fn remove_cart_item(
    state: &AppState,
    cart_id: i32,
    item_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    find_item(&state.orm, cart_id, item_id).await?;
    CartItems::delete_by_id(item_id).exec(&state.orm).await?;

    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Cart,
        Some(cart_id),
        &format!("Cart {cart_id}"),
        &format!("Removed cart item {item_id}."),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn ensure_cart<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
    match Carts::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found(EntityKind::Cart, id)),
    }
}

async fn find_item<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
    item_id: i32,
) -> AppResult<crate::entity::cart_items::Model> {
    let item = CartItems::find_by_id(item_id)
        .filter(CartItemCol::CartId.eq(cart_id))
        .one(db)
        .await?;
    match item {
        Some(i) => Ok(i),
        None => Err(AppError::not_found(EntityKind::CartItem, item_id)),
    }
}
