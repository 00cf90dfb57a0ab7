//! Admin configuration.
//!
//! Each entity the admin exposes is described by a [`ModelAdmin`]: which columns its
//! changelist shows, which of them are editable in place, how rows are searched,
//! filtered and ordered, which related rows are edited inline and which bulk actions
//! apply. The configuration is plain data; `services::admin_service` interprets it.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::EntityKind;

mod site;
mod store;
mod tagging;

pub use site::AdminSite;

pub const DEFAULT_LIST_PER_PAGE: u64 = 100;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModelAdmin {
    pub entity: EntityKind,
    pub list_display: Vec<ListColumn>,
    /// Columns of `list_display` that can be changed from the list itself.
    pub list_editable: Vec<String>,
    /// Field names; a leading `-` sorts descending.
    pub ordering: Vec<String>,
    pub list_per_page: u64,
    /// Fields matched by case-insensitive prefix.
    pub search_fields: Vec<String>,
    pub list_filter: Vec<ListFilter>,
    /// Related rows fetched in the same query as the list.
    pub list_select_related: Vec<EntityKind>,
    pub autocomplete_fields: Vec<String>,
    pub prepopulated_fields: Vec<PrepopulatedField>,
    pub inlines: Vec<InlineConfig>,
    pub actions: Vec<AdminAction>,
}

impl ModelAdmin {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            list_display: vec![],
            list_editable: vec![],
            ordering: vec![],
            list_per_page: DEFAULT_LIST_PER_PAGE,
            search_fields: vec![],
            list_filter: vec![],
            list_select_related: vec![],
            autocomplete_fields: vec![],
            prepopulated_fields: vec![],
            inlines: vec![],
            actions: vec![],
        }
    }

    #[must_use]
    pub fn columns(mut self, columns: Vec<ListColumn>) -> Self {
        self.list_display = columns;
        self
    }

    #[must_use]
    pub fn editable(mut self, fields: &[&str]) -> Self {
        self.list_editable = to_strings(fields);
        self
    }

    #[must_use]
    pub fn ordering(mut self, fields: &[&str]) -> Self {
        self.ordering = to_strings(fields);
        self
    }

    #[must_use]
    pub const fn per_page(mut self, per_page: u64) -> Self {
        self.list_per_page = per_page;
        self
    }

    #[must_use]
    pub fn search(mut self, fields: &[&str]) -> Self {
        self.search_fields = to_strings(fields);
        self
    }

    #[must_use]
    pub fn filters(mut self, filters: Vec<ListFilter>) -> Self {
        self.list_filter = filters;
        self
    }

    #[must_use]
    pub fn select_related(mut self, kinds: &[EntityKind]) -> Self {
        self.list_select_related = kinds.to_vec();
        self
    }

    #[must_use]
    pub fn autocomplete(mut self, fields: &[&str]) -> Self {
        self.autocomplete_fields = to_strings(fields);
        self
    }

    #[must_use]
    pub fn prepopulate(mut self, field: &str, from: &[&str]) -> Self {
        self.prepopulated_fields.push(PrepopulatedField {
            field: field.to_owned(),
            from: to_strings(from),
        });
        self
    }

    #[must_use]
    pub fn inline(mut self, inline: InlineConfig) -> Self {
        self.inlines.push(inline);
        self
    }

    #[must_use]
    pub fn action(mut self, action: AdminAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn is_editable(&self, field: &str) -> bool {
        self.list_editable.iter().any(|f| f == field)
    }

    pub fn has_action(&self, action: AdminAction) -> bool {
        self.actions.contains(&action)
    }

    pub fn inline_for(&self, entity: EntityKind) -> Option<&InlineConfig> {
        self.inlines.iter().find(|inline| inline.entity == entity)
    }

    pub fn filter(&self, parameter: &str) -> Option<&ListFilter> {
        self.list_filter.iter().find(|f| f.parameter() == parameter)
    }
}

/// One changelist column. `key` names a field of the row, stored or computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ListColumn {
    pub key: String,
    pub label: String,
    /// Stored field used when sorting by this column; computed columns without one
    /// cannot be sorted.
    pub sort_field: Option<String>,
}

impl ListColumn {
    pub fn field(key: &str, label: &str) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            sort_field: Some(key.to_owned()),
        }
    }

    pub fn computed(key: &str, label: &str) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            sort_field: None,
        }
    }

    #[must_use]
    pub fn sorted_by(mut self, field: &str) -> Self {
        self.sort_field = Some(field.to_owned());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListFilter {
    /// Exact match on a foreign key column.
    Related {
        field: String,
        label: String,
        target: EntityKind,
    },
    /// Predefined ranges on a timestamp column.
    Date { field: String, label: String },
    /// `field < threshold` when the parameter is present.
    Below {
        field: String,
        label: String,
        threshold: i32,
    },
}

impl ListFilter {
    /// Query-string key that activates the filter.
    pub fn parameter(&self) -> &str {
        match self {
            ListFilter::Related { field, .. }
            | ListFilter::Date { field, .. }
            | ListFilter::Below { field, .. } => field,
        }
    }
}

/// Accepted values of a [`ListFilter::Date`] parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    Today,
    Past7Days,
    ThisMonth,
    ThisYear,
}

impl DateRange {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "today" => Some(DateRange::Today),
            "past_7_days" => Some(DateRange::Past7Days),
            "this_month" => Some(DateRange::ThisMonth),
            "this_year" => Some(DateRange::ThisYear),
            _ => None,
        }
    }

    /// Half-open `[start, end)` interval of the range, in UTC days around `now`.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let tomorrow = today + Days::new(1);
        let (start, end) = match self {
            DateRange::Today => (today, tomorrow),
            DateRange::Past7Days => (today - Days::new(7), tomorrow),
            DateRange::ThisMonth => {
                let first = today.with_day(1).unwrap_or(today);
                (first, first + Months::new(1))
            }
            DateRange::ThisYear => {
                let first = today.with_ordinal(1).unwrap_or(today);
                (first, first + Months::new(12))
            }
        };
        (midnight(start), midnight(end))
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PrepopulatedField {
    pub field: String,
    pub from: Vec<String>,
}

/// Related rows edited together with their parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InlineConfig {
    pub entity: EntityKind,
    /// Field on the inline row that points back at the parent.
    pub parent_field: String,
    pub min_num: u32,
    pub max_num: Option<u32>,
    pub autocomplete_fields: Vec<String>,
}

impl InlineConfig {
    pub fn new(entity: EntityKind, parent_field: &str) -> Self {
        Self {
            entity,
            parent_field: parent_field.to_owned(),
            min_num: 0,
            max_num: None,
            autocomplete_fields: vec![],
        }
    }

    #[must_use]
    pub const fn bounds(mut self, min_num: u32, max_num: u32) -> Self {
        self.min_num = min_num;
        self.max_num = Some(max_num);
        self
    }

    #[must_use]
    pub fn autocomplete(mut self, fields: &[&str]) -> Self {
        self.autocomplete_fields = to_strings(fields);
        self
    }

    /// Checks the number of inline rows submitted with a parent.
    pub fn accepts(&self, count: usize) -> bool {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        count >= self.min_num && self.max_num.is_none_or(|max| count <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    ClearInventory,
}

impl AdminAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "clear_inventory" => Some(AdminAction::ClearInventory),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AdminAction::ClearInventory => "Clear inventory",
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_bounds_are_inclusive() {
        let inline = InlineConfig::new(EntityKind::OrderItem, "order_id").bounds(1, 10);
        assert!(!inline.accepts(0));
        assert!(inline.accepts(1));
        assert!(inline.accepts(10));
        assert!(!inline.accepts(11));

        let open = InlineConfig::new(EntityKind::TaggedItem, "object_id");
        assert!(open.accepts(0));
        assert!(open.accepts(500));
    }

    #[test]
    fn filter_parameter_is_the_field_name() {
        let filter = ListFilter::Below {
            field: "inventory".into(),
            label: "inventory".into(),
            threshold: 10,
        };
        assert_eq!(filter.parameter(), "inventory");
    }

    #[test]
    fn date_ranges_cover_whole_days() {
        let now = DateTime::parse_from_rfc3339("2024-03-15T13:45:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let day = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .unwrap()
                .with_timezone(&Utc)
        };

        assert_eq!(
            DateRange::Today.bounds(now),
            (day("2024-03-15T00:00:00Z"), day("2024-03-16T00:00:00Z"))
        );
        assert_eq!(
            DateRange::Past7Days.bounds(now),
            (day("2024-03-08T00:00:00Z"), day("2024-03-16T00:00:00Z"))
        );
        assert_eq!(
            DateRange::ThisMonth.bounds(now),
            (day("2024-03-01T00:00:00Z"), day("2024-04-01T00:00:00Z"))
        );
        assert_eq!(
            DateRange::ThisYear.bounds(now),
            (day("2024-01-01T00:00:00Z"), day("2025-01-01T00:00:00Z"))
        );
        assert_eq!(DateRange::parse("past_7_days"), Some(DateRange::Past7Days));
        assert_eq!(DateRange::parse("yesterday"), None);
    }

    #[test]
    fn computed_columns_sort_only_when_told_how() {
        let status = ListColumn::computed("inventory_status", "Inventory status");
        assert_eq!(status.sort_field, None);
        let status = status.sorted_by("inventory");
        assert_eq!(status.sort_field.as_deref(), Some("inventory"));
    }
}
