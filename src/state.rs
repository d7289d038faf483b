use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{cart_store::CartStore, config::AppConfig, notify::Mailer};

/// Everything a handler needs, handed to axum as router state.
#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub carts: Arc<CartStore>,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            orm,
            carts: Arc::new(CartStore::new(Duration::from_secs(config.cart_ttl_secs))),
            mailer: Mailer::from_config(&config.mail),
        }
    }
}
