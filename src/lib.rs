//! Stockroom API Library
//!
//! Back-office inventory and point-of-sale service for a small retail store.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod cache;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod openapi;
pub mod services;
pub mod sessions;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use handlers::AppServices;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub sessions: Arc<sessions::SessionStore>,
    pub cache: Arc<cache::InMemoryCache>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Arc<events::EventSender>,
    ) -> Self {
        let cache = Arc::new(cache::InMemoryCache::new());
        let services = AppServices::new(db.clone(), event_sender.clone(), cache.clone());

        Self {
            db,
            config,
            event_sender,
            sessions: Arc::new(sessions::SessionStore::new()),
            cache,
            services,
        }
    }
}

/// Common query parameters for list endpoints.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// The full application router. State is injected by the caller so tests can
/// run against an in-memory database.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/health", get(health_check))
        // Order building (session-scoped)
        .route(
            "/order/",
            get(handlers::orders::view_active_order).post(handlers::orders::scan_item),
        )
        .route("/order/submit/", post(handlers::orders::submit_order))
        .route("/order/success/", get(handlers::orders::order_success))
        .route("/orders/", get(handlers::orders::list_orders))
        // Inventory
        .route("/inventory/", get(handlers::inventory::list_inventory))
        .route("/low-stock/", get(handlers::inventory::list_low_stock))
        .route(
            "/checkin/",
            get(handlers::checkin::checkin_form).post(handlers::checkin::check_in),
        )
        // Product maintenance
        .route(
            "/product/edit/:product_id",
            get(handlers::products::get_product_form).post(handlers::products::update_product),
        )
        .route("/new-product/", post(handlers::products::create_product))
        .merge(openapi::swagger_ui())
        .with_state(state)
}

async fn landing() -> Json<ApiResponse<Value>> {
    let version = env!("CARGO_PKG_VERSION");
    Json(ApiResponse::success(json!({
        "service": "stockroom-api",
        "version": version,
        "docs": "/swagger-ui",
    })))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Ok(Json(ApiResponse::success(json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))))
}
