use crate::entity::EntityKind;

use super::{AdminSite, InlineConfig, ListColumn, ModelAdmin, store};

/// Registers tags and swaps the plain product admin for one that edits tags inline.
/// The inline autocompletes `tag_id`, which needs the tag admin's search fields.
pub(super) fn register(site: &mut AdminSite) {
    site.register(
        ModelAdmin::new(EntityKind::Tag)
            .columns(vec![ListColumn::field("label", "Label")])
            .ordering(&["label"])
            .search(&["label"]),
    );

    let base = site
        .unregister(EntityKind::Product)
        .unwrap_or_else(store::product_admin);
    site.register(base.inline(
        InlineConfig::new(EntityKind::TaggedItem, "object_id").autocomplete(&["tag_id"]),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_admin_gains_tag_inline() {
        let mut site = AdminSite::new();
        store::register(&mut site);
        assert!(site
            .get(EntityKind::Product)
            .and_then(|a| a.inline_for(EntityKind::TaggedItem))
            .is_none());

        register(&mut site);
        let product = site.get(EntityKind::Product).expect("product admin");
        assert!(product.inline_for(EntityKind::TaggedItem).is_some());
        assert!(product.has_action(crate::admin::AdminAction::ClearInventory));
    }
}
