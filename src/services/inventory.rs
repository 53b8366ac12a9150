//! Inventory views (filtered, ordered, paginated) and the stock check-in
//! flow.

use crate::{
    cache::{CacheBackend, InMemoryCache},
    db::DbPool,
    entities::{category, product, Category, Product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Fixed page size for the inventory and low-stock listings.
pub const PAGE_SIZE: u64 = 80;

/// Products with `quantity_in_stock` below this appear in the low-stock view.
pub const LOW_STOCK_THRESHOLD: i32 = 1;

/// Categories change rarely; the filter dropdown is served stale for up to
/// fifteen minutes.
pub const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
const CATEGORY_CACHE_KEY: &str = "categories";

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub barcode_query: Option<String>,
    pub low_stock: bool,
}

/// One page of the product listing, 1-based.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub items: Vec<product::Model>,
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckInInput {
    #[validate(length(min = 1, max = 30, message = "Barcode is required"))]
    pub barcode: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Result of a check-in. An unknown barcode is not an error: the caller
/// routes it to product creation, carrying the barcode as a pre-fill hint.
#[derive(Debug, Clone)]
pub enum CheckInOutcome {
    Restocked(product::Model),
    UnknownBarcode { barcode: String },
}

#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    cache: Arc<InMemoryCache>,
    event_sender: Arc<EventSender>,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>, cache: Arc<InMemoryCache>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db,
            cache,
            event_sender,
        }
    }

    /// Filtered, name-ordered, paginated product view. Out-of-range page
    /// numbers clamp to the nearest valid page instead of erroring.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        page: u64,
    ) -> Result<ProductPage, ServiceError> {
        let mut query = Product::find().order_by_asc(product::Column::Name);

        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(needle) = filter
            .barcode_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
        {
            // Case-insensitive substring match, portable across backends.
            let pattern = format!("%{}%", needle.to_lowercase());
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((
                    product::Entity,
                    product::Column::Barcode,
                ))))
                .like(pattern),
            );
        }
        if filter.low_stock {
            query = query.filter(product::Column::QuantityInStock.lt(LOW_STOCK_THRESHOLD));
        }

        let paginator = query.paginate(&*self.db, PAGE_SIZE);
        let total_items = paginator.num_items().await?;
        let total_pages = paginator.num_pages().await?;

        let last_page = total_pages.max(1);
        let page = page.clamp(1, last_page);
        let items = paginator.fetch_page(page - 1).await?;

        Ok(ProductPage {
            items,
            page,
            total_pages,
            total_items,
            has_next: page < total_pages,
            has_previous: page > 1,
        })
    }

    /// Category list for the filter dropdown, via the TTL cache. Cache
    /// failures degrade to a direct fetch.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        match self.cache.get(CATEGORY_CACHE_KEY).await {
            Ok(Some(raw)) => {
                if let Ok(categories) = serde_json::from_str::<Vec<category::Model>>(&raw) {
                    return Ok(categories);
                }
                warn!("Discarding undecodable category cache entry");
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Category cache read failed"),
        }

        let categories = Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;

        match serde_json::to_string(&categories) {
            Ok(raw) => {
                if let Err(e) = self
                    .cache
                    .set(CATEGORY_CACHE_KEY, &raw, Some(CATEGORY_CACHE_TTL))
                    .await
                {
                    warn!(error = %e, "Category cache write failed");
                }
            }
            Err(e) => warn!(error = %e, "Category list serialization failed"),
        }

        Ok(categories)
    }

    /// Increases stock for a scanned barcode, or signals an unknown product
    /// (no mutation) so the caller can offer the creation flow.
    #[instrument(skip(self, input), fields(barcode = %input.barcode))]
    pub async fn check_in(&self, input: CheckInInput) -> Result<CheckInOutcome, ServiceError> {
        input.validate()?;

        let product = Product::find()
            .filter(product::Column::Barcode.eq(input.barcode.as_str()))
            .one(&*self.db)
            .await?;

        let Some(product) = product else {
            return Ok(CheckInOutcome::UnknownBarcode {
                barcode: input.barcode,
            });
        };

        let new_stock = product.quantity_in_stock + input.quantity;
        let mut active: product::ActiveModel = product.into();
        active.quantity_in_stock = Set(new_stock);
        let product = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::StockCheckedIn {
                product_id: product.id,
                quantity: input.quantity,
            })
            .await;

        info!(product_id = %product.id, quantity_in_stock = product.quantity_in_stock, "Stock checked in");
        Ok(CheckInOutcome::Restocked(product))
    }
}
