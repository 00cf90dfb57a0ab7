use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, ActiveValue::NotSet,
};

use crate::{
    audit,
    dto::orders::{
        CreateOrderRequest, OrderItemInput, OrderList, OrderWithItems, UpdateOrderItemRequest,
        UpdateOrderRequest,
    },
    entity::{
        EntityKind,
        admin_log_entries::ActionFlag,
        customers::{Entity as Customers, Model as CustomerModel},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult, BlockingReference},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::referencing_ids,
    state::AppState,
    validation::{FieldErrors, check_price, check_quantity},
};

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if let Some(customer_id) = query.customer_id {
        condition = condition.add(OrderCol::CustomerId.eq(customer_id));
    }
    if let Some(status) = query.payment_status {
        condition = condition.add(OrderCol::PaymentStatus.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::PlacedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::PlacedAt),
    };
    finder = finder.order_by_desc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await?;

    let orders = finder
        .find_also_related(Customers)
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(order, customer)| order_from_entity(order, customer.as_ref()))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(state: &AppState, id: i32) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .find_also_related(Customers)
        .one(&state.orm)
        .await?;
    let (order, customer) = match order {
        Some(row) => row,
        None => return Err(AppError::not_found(EntityKind::Order, id)),
    };

    let items = items_of(&state.orm, order.id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order, customer.as_ref()),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Creates the order and all of its items in one transaction. Items without a price
/// capture the product's current price.
pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let mut errors = FieldErrors::new();
    let customer = Customers::find_by_id(payload.customer_id).one(&txn).await?;
    if customer.is_none() {
        errors.add(
            "customer_id",
            format!("Customer {} does not exist.", payload.customer_id),
        );
    }
    let items = resolve_items(&txn, &mut errors, &payload.items, "items").await?;
    errors.into_result()?;

    let order = OrderActive {
        id: NotSet,
        placed_at: NotSet,
        payment_status: Set(payload.payment_status.unwrap_or_default()),
        customer_id: Set(payload.customer_id),
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(items.len());
    for (product_id, quantity, unit_price) in items {
        let item = OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            unit_price: Set(unit_price),
        }
        .insert(&txn)
        .await?;
        order_items.push(OrderItem::from(item));
    }

    txn.commit().await?;

    tracing::info!(order_id = order.id, items = order_items.len(), "order created");
    audit::record(
        state,
        ActionFlag::Addition,
        EntityKind::Order,
        Some(order.id),
        &format!("Order {}", order.id),
        &format!("Added with {} item(s).", order_items.len()),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order_from_entity(order, customer.as_ref()),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

/// `placed_at` never changes after creation.
pub async fn update_order(
    state: &AppState,
    id: i32,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::not_found(EntityKind::Order, id)),
    };

    let customer_id = payload.customer_id.unwrap_or(existing.customer_id);
    let customer = Customers::find_by_id(customer_id).one(&state.orm).await?;
    if customer.is_none() {
        return Err(FieldErrors::single(
            "customer_id",
            format!("Customer {customer_id} does not exist."),
        ));
    }

    let mut active: OrderActive = existing.into();
    active.customer_id = Set(customer_id);
    if let Some(status) = payload.payment_status {
        active.payment_status = Set(status);
    }
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = order.id, "order updated");
    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Order,
        Some(order.id),
        &format!("Order {}", order.id),
        "Changed.",
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        order_from_entity(order, customer.as_ref()),
        Some(Meta::empty()),
    ))
}

/// Refused while the order still has items.
pub async fn delete_order(state: &AppState, id: i32) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    if Orders::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::not_found(EntityKind::Order, id));
    }

    let items =
        referencing_ids::<OrderItems, _>(&txn, OrderItemCol::Id, OrderItemCol::OrderId, id).await?;
    if !items.is_empty() {
        return Err(AppError::ReferentialIntegrity {
            entity: EntityKind::Order,
            id,
            blocked_by: vec![BlockingReference {
                entity: EntityKind::OrderItem,
                ids: items,
            }],
        });
    }

    crate::services::tag_service::remove_tags_for(&txn, EntityKind::Order, &[id]).await?;
    Orders::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = id, "order deleted");
    audit::record(
        state,
        ActionFlag::Deletion,
        EntityKind::Order,
        Some(id),
        &format!("Order {id}"),
        "Deleted.",
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn add_order_item(
    state: &AppState,
    order_id: i32,
    payload: OrderItemInput,
) -> AppResult<ApiResponse<OrderItem>> {
    let txn = state.orm.begin().await?;
    if Orders::find_by_id(order_id).one(&txn).await?.is_none() {
        return Err(AppError::not_found(EntityKind::Order, order_id));
    }

    let mut errors = FieldErrors::new();
    let mut resolved = resolve_items(&txn, &mut errors, std::slice::from_ref(&payload), "").await?;
    errors.into_result()?;
    let (product_id, quantity, unit_price) = match resolved.pop() {
        Some(item) => item,
        None => return Err(AppError::BadRequest("No item given".into())),
    };

    let item = OrderItemActive {
        id: NotSet,
        order_id: Set(order_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Order,
        Some(order_id),
        &format!("Order {order_id}"),
        &format!("Added order item {}.", item.id),
    )
    .await;

    Ok(ApiResponse::success(
        "Item added",
        OrderItem::from(item),
        Some(Meta::empty()),
    ))
}

/// Only the quantity can change; the captured price stays.
pub async fn update_order_item(
    state: &AppState,
    order_id: i32,
    item_id: i32,
    payload: UpdateOrderItemRequest,
) -> AppResult<ApiResponse<OrderItem>> {
    let item = find_item(&state.orm, order_id, item_id).await?;

    let mut errors = FieldErrors::new();
    let quantity = check_quantity(&mut errors, "quantity", payload.quantity);
    errors.into_result()?;

    let mut active: OrderItemActive = item.into();
    active.quantity = Set(quantity);
    let item = active.update(&state.orm).await?;

    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Order,
        Some(order_id),
        &format!("Order {order_id}"),
        &format!("Changed quantity of order item {item_id}."),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        OrderItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order_item(
    state: &AppState,
    order_id: i32,
    item_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    find_item(&txn, order_id, item_id).await?;
    crate::services::tag_service::remove_tags_for(&txn, EntityKind::OrderItem, &[item_id]).await?;
    OrderItems::delete_by_id(item_id).exec(&txn).await?;
    txn.commit().await?;

    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Order,
        Some(order_id),
        &format!("Order {order_id}"),
        &format!("Deleted order item {item_id}."),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn items_of<C: ConnectionTrait>(db: &C, order_id: i32) -> AppResult<Vec<OrderItem>> {
    Ok(OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::Id)
        .all(db)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect())
}

async fn find_item<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
    item_id: i32,
) -> AppResult<crate::entity::order_items::Model> {
    let item = OrderItems::find_by_id(item_id)
        .filter(OrderItemCol::OrderId.eq(order_id))
        .one(db)
        .await?;
    match item {
        Some(i) => Ok(i),
        None => Err(AppError::not_found(EntityKind::OrderItem, item_id)),
    }
}

/// Validates item inputs and resolves each to `(product_id, quantity, unit_price)`.
/// Errors are keyed `prefix[i].field`, or just `field` when `prefix` is empty.
async fn resolve_items<C: ConnectionTrait>(
    db: &C,
    errors: &mut FieldErrors,
    inputs: &[OrderItemInput],
    prefix: &str,
) -> AppResult<Vec<(i32, i16, Decimal)>> {
    let product_ids: BTreeSet<i32> = inputs.iter().map(|i| i.product_id).collect();
    let prices: HashMap<i32, Decimal> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        Products::find()
            .select_only()
            .column(ProdCol::Id)
            .column(ProdCol::UnitPrice)
            .filter(ProdCol::Id.is_in(product_ids))
            .into_tuple::<(i32, Decimal)>()
            .all(db)
            .await?
            .into_iter()
            .collect()
    };

    let mut resolved = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let field = |name: &str| {
            if prefix.is_empty() {
                name.to_owned()
            } else {
                format!("{prefix}[{index}].{name}")
            }
        };

        let quantity = check_quantity(errors, &field("quantity"), input.quantity);
        let unit_price = match (input.unit_price, prices.get(&input.product_id)) {
            (_, None) => {
                errors.add(
                    &field("product_id"),
                    format!("Product {} does not exist.", input.product_id),
                );
                continue;
            }
            (Some(price), Some(_)) => {
                check_price(errors, &field("unit_price"), price);
                price
            }
            (None, Some(current)) => current.round_dp(2),
        };
        resolved.push((input.product_id, quantity, unit_price));
    }
    Ok(resolved)
}

fn order_from_entity(model: OrderModel, customer: Option<&CustomerModel>) -> Order {
    let name = customer.map(CustomerModel::full_name).unwrap_or_default();
    Order::from_entity(model, name)
}
