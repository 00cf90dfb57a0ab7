use crate::entity::{EntityKind, products::LOW_INVENTORY_THRESHOLD};

use super::{AdminAction, AdminSite, InlineConfig, ListColumn, ListFilter, ModelAdmin};

const STORE_LIST_PER_PAGE: u64 = 10;

pub(super) fn register(site: &mut AdminSite) {
    site.register(collection_admin());
    site.register(product_admin());
    site.register(customer_admin());
    site.register(order_admin());
}

fn collection_admin() -> ModelAdmin {
    ModelAdmin::new(EntityKind::Collection)
        .columns(vec![
            ListColumn::field("title", "Title"),
            ListColumn::field("featured_product_id", "Featured product"),
            ListColumn::computed("product_count", "Products"),
        ])
        .ordering(&["title"])
        .search(&["title"])
}

pub(super) fn product_admin() -> ModelAdmin {
    ModelAdmin::new(EntityKind::Product)
        .columns(vec![
            ListColumn::field("title", "Title"),
            ListColumn::field("unit_price", "Unit price"),
            ListColumn::computed("inventory_status", "Inventory status").sorted_by("inventory"),
            ListColumn::computed("collection_title", "Collection"),
        ])
        .editable(&["unit_price"])
        .ordering(&["title"])
        .per_page(STORE_LIST_PER_PAGE)
        .search(&["title"])
        .filters(vec![
            ListFilter::Related {
                field: "collection_id".into(),
                label: "collection".into(),
                target: EntityKind::Collection,
            },
            ListFilter::Date {
                field: "last_update".into(),
                label: "last update".into(),
            },
            ListFilter::Below {
                field: "inventory".into(),
                label: "inventory".into(),
                threshold: LOW_INVENTORY_THRESHOLD,
            },
        ])
        .select_related(&[EntityKind::Collection])
        .autocomplete(&["collection_id"])
        .prepopulate("slug", &["title"])
        .action(AdminAction::ClearInventory)
}

fn customer_admin() -> ModelAdmin {
    ModelAdmin::new(EntityKind::Customer)
        .columns(vec![
            ListColumn::field("first_name", "First name"),
            ListColumn::field("last_name", "Last name"),
            ListColumn::field("membership", "Membership"),
            ListColumn::computed("order_count", "Orders"),
        ])
        .editable(&["membership"])
        .ordering(&["first_name", "last_name"])
        .per_page(STORE_LIST_PER_PAGE)
        .search(&["first_name", "last_name"])
}

fn order_admin() -> ModelAdmin {
    ModelAdmin::new(EntityKind::Order)
        .columns(vec![
            ListColumn::field("id", "ID"),
            ListColumn::field("placed_at", "Placed at"),
            ListColumn::computed("customer_full_name", "Customer").sorted_by("customer__first_name"),
            ListColumn::field("payment_status", "Payment status"),
        ])
        .editable(&["payment_status"])
        .ordering(&["-placed_at"])
        .per_page(STORE_LIST_PER_PAGE)
        .select_related(&[EntityKind::Customer])
        .autocomplete(&["customer_id"])
        .inline(
            InlineConfig::new(EntityKind::OrderItem, "order_id")
                .bounds(1, 10)
                .autocomplete(&["product_id"]),
        )
}
