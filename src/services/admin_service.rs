//! Generic admin views driven by the [`ModelAdmin`] registrations.
//!
//! Queries are assembled from the configuration by resolving field names to entity
//! columns, so the same code serves every registered kind. Rows are rendered through
//! the API models, which carry the computed columns (`product_count`,
//! `inventory_status`, ...), and then cut down to the configured columns.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType, Order as Direction,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationDef, RelationTrait, Select,
    sea_query::{Expr, SimpleExpr},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    admin::{AdminAction, DateRange, ListColumn, ListFilter, ModelAdmin},
    audit,
    dto::{
        admin::{
            ActionRequest, ActionResult, AutocompleteItem, AutocompleteResults, ChangeView,
            Changelist, FieldUpdateRequest, InlineRows, SiteEntry, SiteIndex,
        },
        collections::UpdateCollectionRequest,
        customers::UpdateCustomerRequest,
        orders::{CreateOrderRequest, OrderWithItems, UpdateOrderRequest},
        products::{ClearInventoryRequest, UpdateProductRequest},
        promotions::UpdatePromotionRequest,
    },
    entity::{
        Collections, Customers, EntityKind, Orders, Products, Promotions, Tags,
        customers::{Column as CustomerCol, Model as CustomerModel},
        orders::Relation as OrderRelation,
    },
    error::{AppError, AppResult},
    models::{AdminLogEntry, Collection, Customer, Order, Product, Promotion, Tag},
    response::{ApiResponse, Meta},
    routes::params::page_offset,
    services::{
        collection_service, customer_service, order_service, product_service, promotion_service,
        search_term, starts_with, tag_service,
    },
    state::AppState,
    validation::FieldErrors,
};

const AUTOCOMPLETE_LIMIT: u64 = 20;
const RECENT_ACTIONS: u64 = 10;

/// Query-string keys the changelist reads itself; every other key must name a filter.
const PAGE_PARAM: &str = "page";
const SEARCH_PARAM: &str = "q";
const ORDER_PARAM: &str = "o";

pub async fn site_index(state: &AppState) -> AppResult<ApiResponse<SiteIndex>> {
    let entities = state
        .admin
        .iter()
        .map(|admin| SiteEntry {
            entity: admin.entity,
            searchable: !admin.search_fields.is_empty(),
            actions: admin.actions.clone(),
        })
        .collect();
    let recent_actions = audit::recent_actions(state, RECENT_ACTIONS).await?;
    Ok(ApiResponse::success(
        "Admin",
        SiteIndex {
            entities,
            recent_actions,
        },
        None,
    ))
}

pub async fn recent_actions(
    state: &AppState,
    limit: Option<u64>,
) -> AppResult<ApiResponse<Vec<AdminLogEntry>>> {
    let limit = limit.unwrap_or(RECENT_ACTIONS).clamp(1, 100);
    let entries = audit::recent_actions(state, limit).await?;
    Ok(ApiResponse::success("Recent actions", entries, None))
}

pub async fn changelist(
    state: &AppState,
    kind: EntityKind,
    params: HashMap<String, String>,
) -> AppResult<ApiResponse<Changelist>> {
    let admin = model_admin(state, kind)?;
    let requested_page = match params.get(PAGE_PARAM) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| AppError::BadRequest(format!("Invalid page {raw:?}")))?,
        None => 1,
    };
    let per_page = admin.list_per_page;
    let (page, offset) = page_offset(requested_page, per_page);
    let db = &state.orm;

    let (rows, total) = match kind {
        EntityKind::Collection => {
            let (models, total) = select_page::<Collections, _>(db, admin, &params, offset).await?;
            let ids: Vec<i32> = models.iter().map(|c| c.id).collect();
            let counts = collection_service::product_counts(db, &ids).await?;
            let rows = models.into_iter().map(|model| {
                let count = counts.get(&model.id).copied().unwrap_or(0);
                Collection::from_entity(model, count)
            });
            (project_all(rows, &admin.list_display)?, total)
        }
        EntityKind::Product => {
            let (models, total) = select_page::<Products, _>(db, admin, &params, offset).await?;
            let titles = product_service::collection_titles(db, &models).await?;
            let rows = models.into_iter().map(|model| {
                let title = titles.get(&model.id).cloned().unwrap_or_default();
                Product::from_entity(model, title)
            });
            (project_all(rows, &admin.list_display)?, total)
        }
        EntityKind::Promotion => {
            let (models, total) = select_page::<Promotions, _>(db, admin, &params, offset).await?;
            let rows = models.into_iter().map(Promotion::from);
            (project_all(rows, &admin.list_display)?, total)
        }
        EntityKind::Customer => {
            let (models, total) = select_page::<Customers, _>(db, admin, &params, offset).await?;
            let ids: Vec<i32> = models.iter().map(|c| c.id).collect();
            let counts = customer_service::order_counts(db, &ids).await?;
            let rows = models.into_iter().map(|model| {
                let count = counts.get(&model.id).copied().unwrap_or(0);
                Customer::from_entity(model, count)
            });
            (project_all(rows, &admin.list_display)?, total)
        }
        EntityKind::Order => {
            let (models, total) = select_page::<Orders, _>(db, admin, &params, offset).await?;
            let customer_ids: BTreeSet<i32> = models.iter().map(|o| o.customer_id).collect();
            let names = full_names(db, customer_ids).await?;
            let rows = models.into_iter().map(|model| {
                let name = names.get(&model.customer_id).cloned().unwrap_or_default();
                Order::from_entity(model, name)
            });
            (project_all(rows, &admin.list_display)?, total)
        }
        EntityKind::Tag => {
            let (models, total) = select_page::<Tags, _>(db, admin, &params, offset).await?;
            let rows = models.into_iter().map(Tag::from);
            (project_all(rows, &admin.list_display)?, total)
        }
        other => return Err(AppError::BadRequest(format!("{other} has no changelist"))),
    };

    let data = Changelist {
        entity: kind,
        columns: admin.list_display.clone(),
        editable: admin.list_editable.clone(),
        filters: admin.list_filter.clone(),
        actions: admin.actions.clone(),
        rows,
    };
    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success(kind.as_str(), data, Some(meta)))
}

/// One object with the rows of each of its inlines.
pub async fn change_view(
    state: &AppState,
    kind: EntityKind,
    id: i32,
) -> AppResult<ApiResponse<ChangeView>> {
    let admin = model_admin(state, kind)?;

    let object = match kind {
        EntityKind::Collection => to_json(collection_service::get_collection(state, id).await?.data)?,
        EntityKind::Product => to_json(
            product_service::get_product(state, id)
                .await?
                .data
                .map(|detail| detail.product),
        )?,
        EntityKind::Promotion => to_json(promotion_service::get_promotion(state, id).await?.data)?,
        EntityKind::Customer => to_json(customer_service::get_customer(state, id).await?.data)?,
        EntityKind::Order => to_json(
            order_service::get_order(state, id)
                .await?
                .data
                .map(|detail| detail.order),
        )?,
        EntityKind::Tag => match Tags::find_by_id(id).one(&state.orm).await? {
            Some(tag) => to_json(Tag::from(tag))?,
            None => return Err(AppError::not_found(EntityKind::Tag, id)),
        },
        other => return Err(AppError::BadRequest(format!("{other} has no change view"))),
    };

    let mut inlines = Vec::with_capacity(admin.inlines.len());
    for inline in &admin.inlines {
        let rows = match inline.entity {
            EntityKind::OrderItem => order_service::items_of(&state.orm, id)
                .await?
                .into_iter()
                .map(to_json)
                .collect::<AppResult<Vec<_>>>()?,
            EntityKind::TaggedItem => tag_service::tagged_items_for(&state.orm, kind, id)
                .await?
                .into_iter()
                .map(to_json)
                .collect::<AppResult<Vec<_>>>()?,
            other => {
                tracing::warn!(parent = %kind, inline = %other, "inline kind has no rows source");
                vec![]
            }
        };
        inlines.push(InlineRows {
            config: inline.clone(),
            rows,
        });
    }

    Ok(ApiResponse::success(
        kind.as_str(),
        ChangeView {
            entity: kind,
            object,
            inlines,
        },
        None,
    ))
}

/// Changes one `list_editable` field through the entity's regular update, so the
/// same validation applies as for a full edit.
pub async fn update_field(
    state: &AppState,
    kind: EntityKind,
    id: i32,
    payload: FieldUpdateRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let admin = model_admin(state, kind)?;
    let field = payload.field;
    if !admin.is_editable(&field) {
        return Err(FieldErrors::single(
            &field,
            "This field cannot be edited from the list.",
        ));
    }

    let mut patch = serde_json::Map::new();
    patch.insert(field.clone(), payload.value);
    let patch = serde_json::Value::Object(patch);

    let updated = match kind {
        EntityKind::Collection => {
            let request: UpdateCollectionRequest = parse_patch(patch, &field)?;
            to_json(collection_service::update_collection(state, id, request).await?.data)?
        }
        EntityKind::Product => {
            let request: UpdateProductRequest = parse_patch(patch, &field)?;
            to_json(product_service::update_product(state, id, request).await?.data)?
        }
        EntityKind::Promotion => {
            let request: UpdatePromotionRequest = parse_patch(patch, &field)?;
            to_json(promotion_service::update_promotion(state, id, request).await?.data)?
        }
        EntityKind::Customer => {
            let request: UpdateCustomerRequest = parse_patch(patch, &field)?;
            to_json(customer_service::update_customer(state, id, request).await?.data)?
        }
        EntityKind::Order => {
            let request: UpdateOrderRequest = parse_patch(patch, &field)?;
            to_json(order_service::update_order(state, id, request).await?.data)?
        }
        other => return Err(AppError::BadRequest(format!("{other} has no editable fields"))),
    };

    let row = project(updated, &admin.list_display);
    Ok(ApiResponse::success("Updated", row, Some(Meta::empty())))
}

/// Runs a bulk action on the selected rows.
pub async fn run_action(
    state: &AppState,
    kind: EntityKind,
    payload: ActionRequest,
) -> AppResult<ApiResponse<ActionResult>> {
    let admin = model_admin(state, kind)?;
    let action = match AdminAction::parse(&payload.action) {
        Some(action) if admin.has_action(action) => action,
        _ => {
            return Err(AppError::BadRequest(format!(
                "Unknown action {:?} for {kind}",
                payload.action
            )));
        }
    };
    if payload.ids.is_empty() {
        return Err(AppError::BadRequest(
            "Items must be selected in order to perform actions on them.".into(),
        ));
    }

    let response = match action {
        AdminAction::ClearInventory => {
            product_service::clear_inventory(
                state,
                ClearInventoryRequest {
                    product_ids: payload.ids,
                },
            )
            .await?
        }
    };
    let affected = response.data.map(|r| r.affected).unwrap_or(0);

    Ok(ApiResponse::success(
        response.message,
        ActionResult { action, affected },
        Some(Meta::empty()),
    ))
}

/// Up to twenty id/label pairs whose search fields start with `term`.
pub async fn autocomplete(
    state: &AppState,
    kind: EntityKind,
    term: Option<String>,
) -> AppResult<ApiResponse<AutocompleteResults>> {
    let admin = model_admin(state, kind)?;
    if admin.search_fields.is_empty() {
        return Err(AppError::BadRequest(format!(
            "{kind} must define search fields to be used for autocomplete"
        )));
    }
    let term = term.as_deref();
    let db = &state.orm;

    let items = match kind {
        EntityKind::Collection => search::<Collections, _>(db, admin, term)
            .await?
            .into_iter()
            .map(|c| AutocompleteItem { id: c.id, label: c.title })
            .collect(),
        EntityKind::Product => search::<Products, _>(db, admin, term)
            .await?
            .into_iter()
            .map(|p| AutocompleteItem { id: p.id, label: p.title })
            .collect(),
        EntityKind::Promotion => search::<Promotions, _>(db, admin, term)
            .await?
            .into_iter()
            .map(|p| AutocompleteItem {
                id: p.id,
                label: p.description,
            })
            .collect(),
        EntityKind::Customer => search::<Customers, _>(db, admin, term)
            .await?
            .into_iter()
            .map(|c| AutocompleteItem {
                id: c.id,
                label: c.full_name(),
            })
            .collect(),
        EntityKind::Tag => search::<Tags, _>(db, admin, term)
            .await?
            .into_iter()
            .map(|t| AutocompleteItem { id: t.id, label: t.label })
            .collect(),
        other => return Err(AppError::BadRequest(format!("{other} has no autocomplete"))),
    };

    Ok(ApiResponse::success(
        "Autocomplete",
        AutocompleteResults { items },
        None,
    ))
}

/// Creates an order from the admin form: the item count must fit the inline bounds.
pub async fn create_order_with_items(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let admin = model_admin(state, EntityKind::Order)?;
    let inline = admin.inline_for(EntityKind::OrderItem);
    if let Some(inline) = inline.filter(|inline| !inline.accepts(payload.items.len())) {
        let message = match inline.max_num {
            Some(max) => format!("Please submit between {} and {max} items.", inline.min_num),
            None => format!("Please submit at least {} items.", inline.min_num),
        };
        return Err(FieldErrors::single("items", message));
    }
    order_service::create_order(state, payload).await
}

fn model_admin(state: &AppState, kind: EntityKind) -> AppResult<&ModelAdmin> {
    state
        .admin
        .get(kind)
        .ok_or_else(|| AppError::BadRequest(format!("{kind} is not registered in the admin")))
}

/// Separates the relation from the field in a sort key such as `customer__first_name`.
const RELATED_SEPARATOR: &str = "__";

/// Sort keys that reach into a related table.
trait RelatedSort: EntityTrait {
    /// Join and column expression for `field` on `relation`, if the entity knows it.
    fn related_sort(_relation: &str, _field: &str) -> Option<(RelationDef, SimpleExpr)> {
        None
    }
}

impl RelatedSort for Collections {}
impl RelatedSort for Products {}
impl RelatedSort for Promotions {}
impl RelatedSort for Customers {}
impl RelatedSort for Tags {}

impl RelatedSort for Orders {
    fn related_sort(relation: &str, field: &str) -> Option<(RelationDef, SimpleExpr)> {
        if relation != "customer" {
            return None;
        }
        let col = CustomerCol::from_str(field).ok()?;
        Some((OrderRelation::Customers.def(), Expr::col((Customers, col)).into()))
    }
}

fn column<E: EntityTrait>(name: &str) -> Option<E::Column> {
    E::Column::from_str(name).ok()
}

/// Resolves a configured field name. An unknown name is a mistake in the
/// registration, not in the request.
fn config_column<E: EntityTrait>(kind: EntityKind, name: &str) -> AppResult<E::Column> {
    column::<E>(name).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("{kind} admin names unknown field {name:?}"))
    })
}

async fn select_page<E, C>(
    db: &C,
    admin: &ModelAdmin,
    params: &HashMap<String, String>,
    offset: u64,
) -> AppResult<(Vec<E::Model>, u64)>
where
    E: RelatedSort,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let mut select = E::find();
    select = apply_search::<E>(select, admin, params.get(SEARCH_PARAM).map(String::as_str))?;
    select = apply_filters::<E>(select, admin, params)?;
    select = apply_ordering::<E>(select, admin, params.get(ORDER_PARAM).map(String::as_str))?;

    let total = select.clone().count(db).await?;
    let models = select
        .limit(admin.list_per_page)
        .offset(offset)
        .all(db)
        .await?;
    Ok((models, total))
}

async fn search<E, C>(db: &C, admin: &ModelAdmin, term: Option<&str>) -> AppResult<Vec<E::Model>>
where
    E: RelatedSort,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let mut select = apply_search::<E>(E::find(), admin, term)?;
    select = apply_ordering::<E>(select, admin, None)?;
    Ok(select.limit(AUTOCOMPLETE_LIMIT).all(db).await?)
}

/// Any search field starting with the term, case-insensitively.
fn apply_search<E: EntityTrait>(
    select: Select<E>,
    admin: &ModelAdmin,
    term: Option<&str>,
) -> AppResult<Select<E>> {
    let Some(term) = search_term(term) else {
        return Ok(select);
    };
    if admin.search_fields.is_empty() {
        return Ok(select);
    }
    let mut any = Condition::any();
    for field in &admin.search_fields {
        any = any.add(starts_with(config_column::<E>(admin.entity, field)?, term));
    }
    Ok(select.filter(any))
}

fn apply_filters<E: EntityTrait>(
    mut select: Select<E>,
    admin: &ModelAdmin,
    params: &HashMap<String, String>,
) -> AppResult<Select<E>> {
    for (key, value) in params {
        if matches!(key.as_str(), PAGE_PARAM | SEARCH_PARAM | ORDER_PARAM) {
            continue;
        }
        let Some(filter) = admin.filter(key) else {
            return Err(AppError::BadRequest(format!("Unknown filter {key:?}")));
        };
        let col = config_column::<E>(admin.entity, filter.parameter())?;
        select = match filter {
            ListFilter::Related { .. } => {
                let id: i32 = value.parse().map_err(|_| {
                    AppError::BadRequest(format!("Filter {key:?} expects an id, got {value:?}"))
                })?;
                select.filter(col.eq(id))
            }
            ListFilter::Date { .. } => {
                let range = DateRange::parse(value).ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown date range {value:?}"))
                })?;
                let (start, end) = range.bounds(Utc::now());
                select
                    .filter(col.gte(start.fixed_offset()))
                    .filter(col.lt(end.fixed_offset()))
            }
            ListFilter::Below { threshold, .. } => select.filter(col.lt(*threshold)),
        };
    }
    Ok(select)
}

/// `o` lists column keys, `-` prefixed for descending. Without it the configured
/// ordering applies. The primary key always breaks ties.
fn apply_ordering<E: RelatedSort>(
    mut select: Select<E>,
    admin: &ModelAdmin,
    requested: Option<&str>,
) -> AppResult<Select<E>> {
    let mut fields: Vec<String> = vec![];
    match requested.map(str::trim).filter(|o| !o.is_empty()) {
        Some(requested) => {
            for key in requested.split(',') {
                let (desc, key) = match key.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, key),
                };
                let sort_field = admin
                    .list_display
                    .iter()
                    .find(|c| c.key == key)
                    .and_then(|c| c.sort_field.clone())
                    .ok_or_else(|| AppError::BadRequest(format!("Cannot order by {key:?}")))?;
                fields.push(if desc { format!("-{sort_field}") } else { sort_field });
            }
        }
        None => fields.extend(admin.ordering.iter().cloned()),
    }

    let mut joined: Vec<&str> = vec![];
    for field in &fields {
        let (order, name) = match field.strip_prefix('-') {
            Some(rest) => (Direction::Desc, rest),
            None => (Direction::Asc, field.as_str()),
        };
        let Some((relation, related)) = name.split_once(RELATED_SEPARATOR) else {
            select = select.order_by(config_column::<E>(admin.entity, name)?, order);
            continue;
        };
        let (join, expr) = E::related_sort(relation, related).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "{} admin names unknown related field {name:?}",
                admin.entity
            ))
        })?;
        if !joined.contains(&relation) {
            select = select.join(JoinType::LeftJoin, join);
            joined.push(relation);
        }
        select = select.order_by(expr, order);
    }
    if let Some(id) = column::<E>("id") {
        select = select.order_by(id, Direction::Asc);
    }
    Ok(select)
}

async fn full_names<C: ConnectionTrait>(
    db: &C,
    customer_ids: BTreeSet<i32>,
) -> AppResult<HashMap<i32, String>> {
    if customer_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let customers = Customers::find()
        .filter(CustomerCol::Id.is_in(customer_ids))
        .all(db)
        .await?;
    Ok(customers
        .iter()
        .map(|c: &CustomerModel| (c.id, c.full_name()))
        .collect())
}

fn parse_patch<T: DeserializeOwned>(patch: serde_json::Value, field: &str) -> AppResult<T> {
    serde_json::from_value(patch).map_err(|err| FieldErrors::single(field, err.to_string()))
}

fn to_json<T: Serialize>(value: T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|err| AppError::Internal(err.into()))
}

/// Keeps `id` and the configured column keys of a serialized row.
fn project(row: serde_json::Value, columns: &[ListColumn]) -> serde_json::Value {
    let serde_json::Value::Object(mut fields) = row else {
        return row;
    };
    let mut projected = serde_json::Map::new();
    if let Some(id) = fields.remove("id") {
        projected.insert("id".into(), id);
    }
    for column in columns {
        if let Some(value) = fields.remove(&column.key) {
            projected.insert(column.key.clone(), value);
        }
    }
    serde_json::Value::Object(projected)
}

fn project_all<T: Serialize>(
    rows: impl IntoIterator<Item = T>,
    columns: &[ListColumn],
) -> AppResult<Vec<serde_json::Value>> {
    rows.into_iter()
        .map(|row| to_json(row).map(|value| project(value, columns)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_keeps_id_and_configured_columns() {
        let row = serde_json::json!({
            "id": 4,
            "title": "Novel",
            "slug": "novel",
            "inventory_status": "LOW",
        });
        let columns = vec![
            ListColumn::field("title", "Title"),
            ListColumn::computed("inventory_status", "Inventory status"),
        ];
        assert_eq!(
            project(row, &columns),
            serde_json::json!({ "id": 4, "title": "Novel", "inventory_status": "LOW" })
        );
    }
}
