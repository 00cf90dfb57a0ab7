use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::entity::{EntityKind, orders::PaymentStatus};

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// Returns `(page, per_page, offset)`.
    pub fn normalize(&self) -> (u64, u64, u64) {
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let (page, offset) = page_offset(self.page.unwrap_or(1), per_page);
        (page, per_page, offset)
    }
}

/// Largest row offset the databases accept; they bind it as a signed 64-bit integer.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Clamps `page` to `1..` and to the last page whose offset is still bindable.
/// Returns `(page, offset)`.
pub fn page_offset(page: u64, per_page: u64) -> (u64, u64) {
    let per_page = per_page.max(1);
    let page = page.clamp(1, MAX_OFFSET / per_page);
    (page, (page - 1) * per_page)
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    Title,
    UnitPrice,
    Inventory,
    LastUpdate,
}

// Query structs keep `page`/`per_page` inline: urlencoded values nested through
// `#[serde(flatten)]` arrive as strings and fail to parse as numbers.

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub q: Option<String>,
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub q: Option<String>,
    pub collection_id: Option<i32>,
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub customer_id: Option<i32>,
    pub payment_status: Option<PaymentStatus>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaggedItemQuery {
    pub entity_kind: EntityKind,
    pub object_id: i32,
}

/// Documents the fixed changelist keys. Filters are read from the remaining query
/// parameters, keyed by field name.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChangelistQuery {
    pub page: Option<u64>,
    /// Search term, matched as a prefix of every search field.
    pub q: Option<String>,
    /// Comma separated column keys, `-` prefix for descending.
    pub o: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AutocompleteQuery {
    pub term: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentActionsQuery {
    pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        assert_eq!(Pagination::new(0, 500).normalize(), (1, 100, 0));
        assert_eq!(Pagination::new(3, 10).normalize(), (3, 10, 20));
    }

    #[test]
    fn huge_pages_keep_a_bindable_offset() {
        let (page, per_page, offset) = Pagination::new(u64::MAX, 100).normalize();
        assert_eq!(page, MAX_OFFSET / 100);
        assert_eq!(offset, (page - 1) * per_page);
        assert!(offset <= MAX_OFFSET);

        let (page, offset) = page_offset(u64::MAX, 1);
        assert_eq!(page, MAX_OFFSET);
        assert_eq!(offset, MAX_OFFSET - 1);
    }
}
