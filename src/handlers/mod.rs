pub mod checkin;
pub mod inventory;
pub mod orders;
pub mod products;

use crate::cache::InMemoryCache;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates the business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<crate::services::orders::OrderWorkflowService>,
    pub inventory: Arc<crate::services::inventory::InventoryService>,
    pub products: Arc<crate::services::products::ProductService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, cache: Arc<InMemoryCache>) -> Self {
        let orders = Arc::new(crate::services::orders::OrderWorkflowService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let inventory = Arc::new(crate::services::inventory::InventoryService::new(
            db.clone(),
            cache.clone(),
            event_sender.clone(),
        ));
        let products = Arc::new(crate::services::products::ProductService::new(
            db,
            cache,
            event_sender,
        ));

        Self {
            orders,
            inventory,
            products,
        }
    }
}
