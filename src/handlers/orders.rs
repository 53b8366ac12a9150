//! The order-building surface: the session's active order, barcode scans,
//! finalization, and the order list.

use crate::errors::ServiceError;
use crate::services::orders::{LineItem, OrderSummary, ScanInput};
use crate::sessions::session_id_from_jar;
use crate::{entities::order, ApiResponse, AppState, ListQuery, PaginatedResponse};
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub total_price: Decimal,
    pub order_date: DateTime<Utc>,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            total_price: model.total_price,
            order_date: model.order_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LineItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub barcode: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl From<LineItem> for LineItemResponse {
    fn from(line: LineItem) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            product_name: line.product_name,
            barcode: line.barcode,
            quantity: line.quantity,
            price: line.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub order_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub lines: Vec<LineItemResponse>,
    pub subtotal: Decimal,
    /// `subtotal` with the fixed 13% tax applied.
    pub total_with_tax: Decimal,
}

impl From<OrderSummary> for OrderSummaryResponse {
    fn from(summary: OrderSummary) -> Self {
        Self {
            order_id: summary.order_id,
            order_date: summary.order_date,
            lines: summary.lines.into_iter().map(Into::into).collect(),
            subtotal: summary.subtotal,
            total_with_tax: summary.total_with_tax,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitOrderResponse {
    pub order_id: Uuid,
    pub message: String,
}

/// Request body for a barcode scan.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanRequest {
    pub barcode: String,
    pub quantity: i32,
}

/// Resolves the session's order and binds it to the slot. Split out so the
/// handlers can attach the session cookie to success and error responses
/// alike; a client that loses the cookie on a failed scan would otherwise
/// strand the order it just created.
async fn resolve_and_bind(
    state: &AppState,
    session_id: Uuid,
) -> Result<crate::entities::order::Model, ServiceError> {
    let active = state.sessions.active_order(session_id);
    let order = state.services.orders.resolve_active_order(active).await?;
    state.sessions.set_active_order(session_id, order.id);
    Ok(order)
}

async fn active_order_summary(
    state: &AppState,
    session_id: Uuid,
) -> Result<OrderSummaryResponse, ServiceError> {
    let order = resolve_and_bind(state, session_id).await?;
    let summary = state.services.orders.order_summary(order.id).await?;
    Ok(OrderSummaryResponse::from(summary))
}

/// Resolve (or lazily create) the session's active order and return its
/// summary.
#[utoipa::path(
    get,
    path = "/order/",
    responses(
        (status = 200, description = "Active order summary", body = OrderSummaryResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn view_active_order(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (session_id, jar) = session_id_from_jar(jar);
    let result = active_order_summary(&state, session_id)
        .await
        .map(|summary| Json(ApiResponse::success(summary)));
    (jar, result)
}

/// Apply a barcode scan to the session's active order.
#[utoipa::path(
    post,
    path = "/order/",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan applied; updated order summary", body = OrderSummaryResponse),
        (status = 404, description = "Unknown barcode", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse),
        (status = 400, description = "Invalid scan payload", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn scan_item(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<ScanRequest>,
) -> impl IntoResponse {
    let (session_id, jar) = session_id_from_jar(jar);
    let result = scan_and_summarize(&state, session_id, payload).await;
    (jar, result.map(|summary| Json(ApiResponse::success(summary))))
}

async fn scan_and_summarize(
    state: &AppState,
    session_id: Uuid,
    payload: ScanRequest,
) -> Result<OrderSummaryResponse, ServiceError> {
    let order = resolve_and_bind(state, session_id).await?;

    state
        .services
        .orders
        .apply_scan(
            order.id,
            ScanInput {
                barcode: payload.barcode,
                quantity: payload.quantity,
            },
        )
        .await?;

    let summary = state.services.orders.order_summary(order.id).await?;
    Ok(OrderSummaryResponse::from(summary))
}

/// Finalize the active order: clears the session slot only. The order rows
/// stay exactly as accumulated.
#[utoipa::path(
    post,
    path = "/order/submit/",
    responses(
        (status = 200, description = "Order finalized", body = SubmitOrderResponse),
        (status = 404, description = "No active order for this session", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn submit_order(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (session_id, jar) = session_id_from_jar(jar);
    let result = finalize_active(&state, session_id).await;
    (jar, result.map(|submitted| Json(ApiResponse::success(submitted))))
}

async fn finalize_active(
    state: &AppState,
    session_id: Uuid,
) -> Result<SubmitOrderResponse, ServiceError> {
    let order_id = state
        .sessions
        .active_order(session_id)
        .ok_or_else(|| ServiceError::NotFound("No active order for this session".to_string()))?;

    let order = state.services.orders.finalize(order_id).await?;
    state.sessions.clear_active_order(session_id);

    Ok(SubmitOrderResponse {
        order_id: order.id,
        message: "Order submitted. A new order will start on the next scan.".to_string(),
    })
}

/// Confirmation payload shown after a successful submit.
pub async fn order_success() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "message": "Order submitted successfully."
        }))),
    )
}

/// List all orders, newest first.
#[utoipa::path(
    get,
    path = "/orders/",
    params(ListQuery),
    responses(
        (status = 200, description = "Order list", body = PaginatedResponse<OrderResponse>)
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let list = state
        .services
        .orders
        .list_orders(query.page, query.limit)
        .await?;

    let total_pages = if list.per_page == 0 {
        0
    } else {
        list.total.div_ceil(list.per_page)
    };

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: list
            .orders
            .into_iter()
            .map(OrderResponse::from)
            .collect::<Vec<_>>(),
        total: list.total,
        page: list.page,
        limit: list.per_page,
        total_pages,
    })))
}
