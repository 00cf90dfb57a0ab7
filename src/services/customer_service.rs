use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, ActiveValue::NotSet,
};

use crate::{
    audit,
    dto::customers::{AddressRequest, CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
    entity::{
        EntityKind,
        addresses::{ActiveModel as AddressActive, Entity as Addresses},
        admin_log_entries::ActionFlag,
        customers::{ActiveModel, Column, Entity as Customers},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult, BlockingReference},
    models::{Address, Customer},
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    services::{grouped_counts, referencing_ids, search_term, starts_with, tag_service},
    state::AppState,
    validation::{FieldErrors, MAX_CHAR_LENGTH, check_email, check_text},
};

pub async fn list_customers(
    state: &AppState,
    query: SearchQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Customers::find();
    if let Some(search) = search_term(query.q.as_deref()) {
        finder = finder.filter(
            Condition::any()
                .add(starts_with(Column::FirstName, search))
                .add(starts_with(Column::LastName, search)),
        );
    }
    finder = finder
        .order_by_asc(Column::FirstName)
        .order_by_asc(Column::LastName)
        .order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await?;
    let models = finder.limit(limit).offset(offset).all(&state.orm).await?;

    let ids: Vec<i32> = models.iter().map(|c| c.id).collect();
    let counts = order_counts(&state.orm, &ids).await?;
    let items = models
        .into_iter()
        .map(|model| {
            let count = counts.get(&model.id).copied().unwrap_or(0);
            Customer::from_entity(model, count)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Customers", CustomerList { items }, Some(meta)))
}

/// Number of orders per customer, in one grouped query.
pub async fn order_counts<C: ConnectionTrait>(
    db: &C,
    customer_ids: &[i32],
) -> AppResult<HashMap<i32, u64>> {
    Ok(grouped_counts::<Orders, _>(db, OrderCol::CustomerId, customer_ids).await?)
}

pub async fn get_customer(state: &AppState, id: i32) -> AppResult<ApiResponse<Customer>> {
    let customer = Customers::find_by_id(id).one(&state.orm).await?;
    let customer = match customer {
        Some(c) => c,
        None => return Err(AppError::not_found(EntityKind::Customer, id)),
    };
    let count = order_counts(&state.orm, &[id])
        .await?
        .get(&id)
        .copied()
        .unwrap_or(0);
    Ok(ApiResponse::success(
        "Customer",
        Customer::from_entity(customer, count),
        None,
    ))
}

pub async fn create_customer(
    state: &AppState,
    payload: CreateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let email = payload.email.trim().to_owned();

    let mut errors = FieldErrors::new();
    check_text(&mut errors, "first_name", &payload.first_name, MAX_CHAR_LENGTH);
    check_text(&mut errors, "last_name", &payload.last_name, MAX_CHAR_LENGTH);
    check_email(&mut errors, "email", &email);
    check_text(&mut errors, "phone", &payload.phone, MAX_CHAR_LENGTH);
    errors.into_result()?;

    ensure_email_free(&state.orm, &email, None).await?;

    let customer = ActiveModel {
        id: NotSet,
        first_name: Set(payload.first_name.trim().to_owned()),
        last_name: Set(payload.last_name.trim().to_owned()),
        email: Set(email.clone()),
        phone: Set(payload.phone.trim().to_owned()),
        birth_date: Set(payload.birth_date),
        membership: Set(payload.membership.unwrap_or_default()),
    }
    .insert(&state.orm)
    .await
    .map_err(|err| AppError::from_unique_violation(err, EntityKind::Customer, "email", &email))?;

    tracing::info!(customer_id = customer.id, "customer created");
    audit::record(
        state,
        ActionFlag::Addition,
        EntityKind::Customer,
        Some(customer.id),
        &customer.full_name(),
        "Added.",
    )
    .await;

    Ok(ApiResponse::success(
        "Customer created",
        Customer::from_entity(customer, 0),
        Some(Meta::empty()),
    ))
}

pub async fn update_customer(
    state: &AppState,
    id: i32,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let existing = Customers::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::not_found(EntityKind::Customer, id)),
    };

    let email = payload.email.as_deref().map(|e| e.trim().to_owned());

    let mut errors = FieldErrors::new();
    if let Some(first_name) = &payload.first_name {
        check_text(&mut errors, "first_name", first_name, MAX_CHAR_LENGTH);
    }
    if let Some(last_name) = &payload.last_name {
        check_text(&mut errors, "last_name", last_name, MAX_CHAR_LENGTH);
    }
    if let Some(email) = &email {
        check_email(&mut errors, "email", email);
    }
    if let Some(phone) = &payload.phone {
        check_text(&mut errors, "phone", phone, MAX_CHAR_LENGTH);
    }
    errors.into_result()?;

    if let Some(email) = &email {
        ensure_email_free(&state.orm, email, Some(id)).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(first_name.trim().to_owned());
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name.trim().to_owned());
    }
    if let Some(email) = &email {
        active.email = Set(email.clone());
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone.trim().to_owned());
    }
    if let Some(birth_date) = payload.birth_date {
        active.birth_date = Set(birth_date);
    }
    if let Some(membership) = payload.membership {
        active.membership = Set(membership);
    }

    let customer = active.update(&state.orm).await.map_err(|err| {
        AppError::from_unique_violation(
            err,
            EntityKind::Customer,
            "email",
            email.as_deref().unwrap_or_default(),
        )
    })?;

    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Customer,
        Some(customer.id),
        &customer.full_name(),
        "Changed.",
    )
    .await;

    let count = order_counts(&state.orm, &[id])
        .await?
        .get(&id)
        .copied()
        .unwrap_or(0);
    Ok(ApiResponse::success(
        "Updated",
        Customer::from_entity(customer, count),
        Some(Meta::empty()),
    ))
}

/// Refused while the customer has orders. The address goes with the customer.
pub async fn delete_customer(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;

    let customer = Customers::find_by_id(id).one(&txn).await?;
    let customer = match customer {
        Some(c) => c,
        None => return Err(AppError::not_found(EntityKind::Customer, id)),
    };

    let orders = referencing_ids::<Orders, _>(&txn, OrderCol::Id, OrderCol::CustomerId, id).await?;
    if !orders.is_empty() {
        return Err(AppError::ReferentialIntegrity {
            entity: EntityKind::Customer,
            id,
            blocked_by: vec![BlockingReference {
                entity: EntityKind::Order,
                ids: orders,
            }],
        });
    }

    Addresses::delete_by_id(id).exec(&txn).await?;
    tag_service::remove_tags_for(&txn, EntityKind::Address, &[id]).await?;
    tag_service::remove_tags_for(&txn, EntityKind::Customer, &[id]).await?;
    Customers::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(customer_id = id, "customer deleted");
    audit::record(
        state,
        ActionFlag::Deletion,
        EntityKind::Customer,
        Some(id),
        &customer.full_name(),
        "Deleted.",
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn get_address(state: &AppState, customer_id: i32) -> AppResult<ApiResponse<Address>> {
    ensure_customer(&state.orm, customer_id).await?;
    let address = Addresses::find_by_id(customer_id).one(&state.orm).await?;
    let address = match address {
        Some(a) => a,
        None => return Err(AppError::not_found(EntityKind::Address, customer_id)),
    };
    Ok(ApiResponse::success("Address", Address::from(address), None))
}

/// Creates the customer's address, or replaces the one it already has.
pub async fn set_address(
    state: &AppState,
    customer_id: i32,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "street", &payload.street, MAX_CHAR_LENGTH);
    check_text(&mut errors, "city", &payload.city, MAX_CHAR_LENGTH);
    errors.into_result()?;

    let txn = state.orm.begin().await?;
    ensure_customer(&txn, customer_id).await?;

    let existing = Addresses::find_by_id(customer_id).one(&txn).await?;
    let (address, flag) = match existing {
        Some(address) => {
            let mut active: AddressActive = address.into();
            active.street = Set(payload.street.trim().to_owned());
            active.city = Set(payload.city.trim().to_owned());
            (active.update(&txn).await?, ActionFlag::Change)
        }
        None => {
            let address = AddressActive {
                customer_id: Set(customer_id),
                street: Set(payload.street.trim().to_owned()),
                city: Set(payload.city.trim().to_owned()),
            }
            .insert(&txn)
            .await?;
            (address, ActionFlag::Addition)
        }
    };
    txn.commit().await?;

    audit::record(
        state,
        flag,
        EntityKind::Address,
        Some(customer_id),
        &format!("{}, {}", address.street, address.city),
        "Saved.",
    )
    .await;

    Ok(ApiResponse::success(
        "Address saved",
        Address::from(address),
        Some(Meta::empty()),
    ))
}

pub async fn delete_address(
    state: &AppState,
    customer_id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    ensure_customer(&txn, customer_id).await?;
    let result = Addresses::delete_by_id(customer_id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found(EntityKind::Address, customer_id));
    }
    tag_service::remove_tags_for(&txn, EntityKind::Address, &[customer_id]).await?;
    txn.commit().await?;

    audit::record(
        state,
        ActionFlag::Deletion,
        EntityKind::Address,
        Some(customer_id),
        &format!("address of customer {customer_id}"),
        "Deleted.",
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn ensure_customer<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
    match Customers::find_by_id(id).count(db).await? {
        0 => Err(AppError::not_found(EntityKind::Customer, id)),
        _ => Ok(()),
    }
}

/// The unique index on `email` still backs this check.
async fn ensure_email_free<C: ConnectionTrait>(
    db: &C,
    email: &str,
    except: Option<i32>,
) -> AppResult<()> {
    let mut finder = Customers::find().filter(Column::Email.eq(email));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.count(db).await? > 0 {
        return Err(AppError::Uniqueness {
            entity: EntityKind::Customer,
            field: "email",
            value: email.to_owned(),
        });
    }
    Ok(())
}
