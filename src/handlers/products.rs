//! Product maintenance: creating new products and editing existing ones.

use crate::errors::ServiceError;
use crate::handlers::inventory::{CategoryResponse, ProductResponse};
use crate::services::products::{CreateProductInput, UpdateProductInput};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// The edit form payload: the product's current values plus the category
/// dropdown.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductFormResponse {
    pub product: ProductResponse,
    pub categories: Vec<CategoryResponse>,
}

/// Fetch a product for editing, with the category dropdown alongside it.
#[utoipa::path(
    get,
    path = "/product/edit/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product to edit")),
    responses(
        (status = 200, description = "Product and category choices", body = ProductFormResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product_form(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.get_product(product_id).await?;
    let categories = state.services.inventory.categories().await?;

    Ok(Json(ApiResponse::success(ProductFormResponse {
        product: product.into(),
        categories: categories.into_iter().map(Into::into).collect(),
    })))
}

/// Apply edits to a product. Absent fields are left untouched; discount is
/// not editable from this surface.
#[utoipa::path(
    post,
    path = "/product/edit/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product to edit")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Updated product", body = ProductResponse),
        (status = 400, description = "Invalid fields", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state
        .services
        .products
        .update_product(product_id, payload)
        .await?;

    Ok(Json(ApiResponse::success(ProductResponse::from(product))))
}

/// Create a product. Typically reached from check-in after an unknown
/// barcode, with the barcode pre-filled by the client.
#[utoipa::path(
    post,
    path = "/new-product/",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Created product", body = ProductResponse),
        (status = 400, description = "Invalid fields", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Barcode already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.create_product(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ProductResponse::from(product))),
    ))
}
