use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, ActiveValue::NotSet,
};

use crate::{
    audit,
    dto::promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
    entity::{
        EntityKind,
        admin_log_entries::ActionFlag,
        product_promotions::{Column as LinkCol, Entity as ProductPromotions},
        promotions::{ActiveModel, Column, Entity as Promotions},
    },
    error::{AppError, AppResult},
    models::Promotion,
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    services::{contains, search_term},
    state::AppState,
    validation::{FieldErrors, MAX_CHAR_LENGTH, check_text},
};

pub async fn list_promotions(
    state: &AppState,
    query: SearchQuery,
) -> AppResult<ApiResponse<PromotionList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Promotions::find();
    if let Some(search) = search_term(query.q.as_deref()) {
        finder = finder.filter(contains(Column::Description, search));
    }
    finder = finder.order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Promotion::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Promotions", PromotionList { items }, Some(meta)))
}

pub async fn get_promotion(state: &AppState, id: i32) -> AppResult<ApiResponse<Promotion>> {
    let promotion = Promotions::find_by_id(id).one(&state.orm).await?;
    let promotion = match promotion {
        Some(p) => p,
        None => return Err(AppError::not_found(EntityKind::Promotion, id)),
    };
    Ok(ApiResponse::success("Promotion", Promotion::from(promotion), None))
}

pub async fn create_promotion(
    state: &AppState,
    payload: CreatePromotionRequest,
) -> AppResult<ApiResponse<Promotion>> {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "description", &payload.description, MAX_CHAR_LENGTH);
    check_discount(&mut errors, payload.discount);
    errors.into_result()?;

    let promotion = ActiveModel {
        id: NotSet,
        description: Set(payload.description.trim().to_owned()),
        discount: Set(payload.discount),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(promotion_id = promotion.id, "promotion created");
    audit::record(
        state,
        ActionFlag::Addition,
        EntityKind::Promotion,
        Some(promotion.id),
        &promotion.description,
        "Added.",
    )
    .await;

    Ok(ApiResponse::success(
        "Promotion created",
        Promotion::from(promotion),
        Some(Meta::empty()),
    ))
}

pub async fn update_promotion(
    state: &AppState,
    id: i32,
    payload: UpdatePromotionRequest,
) -> AppResult<ApiResponse<Promotion>> {
    let existing = Promotions::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::not_found(EntityKind::Promotion, id)),
    };

    let mut errors = FieldErrors::new();
    if let Some(description) = &payload.description {
        check_text(&mut errors, "description", description, MAX_CHAR_LENGTH);
    }
    if let Some(discount) = payload.discount {
        check_discount(&mut errors, discount);
    }
    errors.into_result()?;

    let mut active: ActiveModel = existing.into();
    if let Some(description) = payload.description {
        active.description = Set(description.trim().to_owned());
    }
    if let Some(discount) = payload.discount {
        active.discount = Set(discount);
    }
    let promotion = active.update(&state.orm).await?;

    audit::record(
        state,
        ActionFlag::Change,
        EntityKind::Promotion,
        Some(promotion.id),
        &promotion.description,
        "Changed.",
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Promotion::from(promotion),
        Some(Meta::empty()),
    ))
}

/// Products lose the promotion; they are not otherwise touched.
pub async fn delete_promotion(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let promotion = Promotions::find_by_id(id).one(&txn).await?;
    let promotion = match promotion {
        Some(p) => p,
        None => return Err(AppError::not_found(EntityKind::Promotion, id)),
    };

    ProductPromotions::delete_many()
        .filter(LinkCol::PromotionId.eq(id))
        .exec(&txn)
        .await?;
    Promotions::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(promotion_id = id, "promotion deleted");
    audit::record(
        state,
        ActionFlag::Deletion,
        EntityKind::Promotion,
        Some(id),
        &promotion.description,
        "Deleted.",
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// A discount is a fraction of the price.
fn check_discount(errors: &mut FieldErrors, discount: f64) {
    if !discount.is_finite() || !(0.0..=1.0).contains(&discount) {
        errors.add("discount", "Ensure this value is between 0 and 1.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_must_be_a_fraction() {
        for ok in [0.0, 0.15, 1.0] {
            let mut errors = FieldErrors::new();
            check_discount(&mut errors, ok);
            assert!(errors.is_empty(), "{ok} should be accepted");
        }
        for bad in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let mut errors = FieldErrors::new();
            check_discount(&mut errors, bad);
            assert!(errors.contains("discount"), "{bad} should be rejected");
        }
    }
}
