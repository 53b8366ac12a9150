//! Stock check-in: receiving deliveries by scanning barcodes.

use crate::errors::ServiceError;
use crate::handlers::inventory::ProductResponse;
use crate::services::inventory::{CheckInInput, CheckInOutcome};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckInRequest {
    pub barcode: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckInResponse {
    pub product: ProductResponse,
    pub quantity_added: i32,
}

/// Describes the check-in form so a client can render it without a prior
/// round-trip.
pub async fn checkin_form() -> impl IntoResponse {
    Json(ApiResponse::success(serde_json::json!({
        "fields": ["barcode", "quantity"],
        "message": "Scan a barcode and post it with a quantity to add stock."
    })))
}

/// Add delivered stock to the product matching the scanned barcode.
///
/// An unknown barcode is a 404 carrying the barcode back, so the client can
/// jump straight to product creation with the field pre-filled.
#[utoipa::path(
    post,
    path = "/checkin/",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Stock added", body = CheckInResponse),
        (status = 404, description = "No product with that barcode"),
        (status = 400, description = "Invalid check-in payload", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn check_in(
    State(state): State<AppState>,
    Json(payload): Json<CheckInRequest>,
) -> Result<Response, ServiceError> {
    let outcome = state
        .services
        .inventory
        .check_in(CheckInInput {
            barcode: payload.barcode,
            quantity: payload.quantity,
        })
        .await?;

    match outcome {
        CheckInOutcome::Restocked(product) => Ok(Json(ApiResponse::success(CheckInResponse {
            product: product.into(),
            quantity_added: payload.quantity,
        }))
        .into_response()),
        CheckInOutcome::UnknownBarcode { barcode } => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "unknown_product": true,
                "barcode": barcode,
                "message": format!(
                    "No product found with the barcode '{}'. You can create it now.",
                    barcode
                ),
            })),
        )
            .into_response()),
    }
}
