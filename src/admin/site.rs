use std::collections::BTreeMap;

use crate::entity::EntityKind;

use super::{ModelAdmin, store, tagging};

/// Registry of admin configurations, one per entity kind.
#[derive(Debug, Clone, Default)]
pub struct AdminSite {
    registry: BTreeMap<EntityKind, ModelAdmin>,
}

impl AdminSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store registrations with the tag-aware product admin in place.
    pub fn storefront() -> Self {
        let mut site = Self::new();
        store::register(&mut site);
        tagging::register(&mut site);
        site
    }

    /// Returns `false` and leaves the site unchanged if the kind is already registered.
    pub fn register(&mut self, admin: ModelAdmin) -> bool {
        if self.is_registered(admin.entity) {
            tracing::warn!(entity = %admin.entity, "admin already registered");
            return false;
        }
        self.registry.insert(admin.entity, admin);
        true
    }

    pub fn unregister(&mut self, entity: EntityKind) -> Option<ModelAdmin> {
        self.registry.remove(&entity)
    }

    pub fn get(&self, entity: EntityKind) -> Option<&ModelAdmin> {
        self.registry.get(&entity)
    }

    pub fn is_registered(&self, entity: EntityKind) -> bool {
        self.registry.contains_key(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.registry.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_refuses_duplicates() {
        let mut site = AdminSite::new();
        assert!(site.register(ModelAdmin::new(EntityKind::Tag)));
        assert!(!site.register(ModelAdmin::new(EntityKind::Tag).per_page(5)));
        assert_eq!(site.get(EntityKind::Tag).map(|a| a.list_per_page), Some(100));

        assert!(site.unregister(EntityKind::Tag).is_some());
        assert!(!site.is_registered(EntityKind::Tag));
        assert!(site.register(ModelAdmin::new(EntityKind::Tag).per_page(5)));
    }

    #[test]
    fn storefront_registers_store_entities() {
        let site = AdminSite::storefront();
        let kinds: Vec<_> = site.iter().map(|a| a.entity).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Collection,
                EntityKind::Product,
                EntityKind::Customer,
                EntityKind::Order,
                EntityKind::Tag,
            ]
        );
    }
}
