use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::admin::AdminSite;

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub admin: Arc<AdminSite>,
}

impl AppState {
    /// State with the storefront admin registrations.
    pub fn new(orm: DatabaseConnection) -> Self {
        Self {
            orm,
            admin: Arc::new(AdminSite::storefront()),
        }
    }
}
