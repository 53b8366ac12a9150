//! Inventory browsing: the paginated product list, the low-stock slice of it,
//! and the cached category dropdown both views share.

use crate::errors::ServiceError;
use crate::services::inventory::{ProductFilter, ProductPage, LOW_STOCK_THRESHOLD, PAGE_SIZE};
use crate::{
    entities::{category, product},
    ApiResponse, AppState,
};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub item_number: String,
    pub price: Decimal,
    pub barcode: String,
    pub quantity_in_stock: i32,
    pub unit_size: String,
    pub description: String,
    pub discount: String,
    pub category_id: Uuid,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            brand: model.brand,
            item_number: model.item_number,
            price: model.price,
            barcode: model.barcode,
            quantity_in_stock: model.quantity_in_stock,
            unit_size: model.unit_size,
            description: model.description,
            discount: model.discount,
            category_id: model.category_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Query parameters for both inventory views. Out-of-range pages are clamped,
/// never rejected.
#[derive(Debug, Deserialize, IntoParams)]
pub struct InventoryQuery {
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring match against barcodes.
    pub barcode_query: Option<String>,
    pub page: Option<u64>,
}

/// A page of products plus the category dropdown and the filter echo the
/// client needs to rebuild its controls.
#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryPageResponse {
    pub products: Vec<ProductResponse>,
    pub categories: Vec<CategoryResponse>,
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub page_size: u64,
    pub selected_category_id: Option<Uuid>,
    pub barcode_query: Option<String>,
}

impl InventoryPageResponse {
    fn new(
        page: ProductPage,
        categories: Vec<category::Model>,
        filter: &ProductFilter,
    ) -> Self {
        Self {
            products: page.items.into_iter().map(Into::into).collect(),
            categories: categories.into_iter().map(Into::into).collect(),
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            has_next: page.has_next,
            has_previous: page.has_previous,
            page_size: PAGE_SIZE,
            selected_category_id: filter.category_id,
            barcode_query: filter.barcode_query.clone(),
        }
    }
}

/// The low-stock view is the inventory view with a fixed extra filter; the
/// threshold is reported so the client can label the page.
#[derive(Debug, Serialize, ToSchema)]
pub struct LowStockPageResponse {
    pub threshold: i32,
    #[serde(flatten)]
    pub inventory: InventoryPageResponse,
}

async fn load_page(
    state: &AppState,
    query: InventoryQuery,
    low_stock: bool,
) -> Result<InventoryPageResponse, ServiceError> {
    let filter = ProductFilter {
        category_id: query.category_id,
        barcode_query: query.barcode_query,
        low_stock,
    };

    let page = state
        .services
        .inventory
        .list_products(filter.clone(), query.page.unwrap_or(1))
        .await?;
    let categories = state.services.inventory.categories().await?;

    Ok(InventoryPageResponse::new(page, categories, &filter))
}

/// Paginated product listing with optional category and barcode filters.
#[utoipa::path(
    get,
    path = "/inventory/",
    params(InventoryQuery),
    responses(
        (status = 200, description = "A page of products", body = InventoryPageResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = load_page(&state, query, false).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// The inventory listing restricted to products at or below the low-stock
/// threshold.
#[utoipa::path(
    get,
    path = "/low-stock/",
    params(InventoryQuery),
    responses(
        (status = 200, description = "A page of low-stock products", body = LowStockPageResponse)
    ),
    tag = "inventory"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let inventory = load_page(&state, query, true).await?;
    Ok(Json(ApiResponse::success(LowStockPageResponse {
        threshold: LOW_STOCK_THRESHOLD,
        inventory,
    })))
}
