use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "1.0.0",
        description = r#"
# Stockroom Inventory & Point-of-Sale API

Back-office API for a small retail store: barcode-driven order building,
stock check-in, inventory browsing, and product maintenance.

## Sessions

Order building is session-scoped. The server issues a `pos_session` cookie on
first contact; the active order rides on it until the order is submitted.

## Error Handling

Errors use a consistent response format with appropriate HTTP status codes:

```json
{
  "error": "Not Found",
  "message": "No product found with the barcode '12345'. Please check and try again.",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

The inventory views serve fixed pages of 80 products; out-of-range `page`
values are clamped, never rejected. The order list takes `page` and `limit`.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "orders", description = "Order building and history"),
        (name = "inventory", description = "Inventory browsing and stock check-in"),
        (name = "products", description = "Product maintenance"),
        (name = "health", description = "Health check")
    ),
    paths(
        crate::handlers::orders::view_active_order,
        crate::handlers::orders::scan_item,
        crate::handlers::orders::submit_order,
        crate::handlers::orders::list_orders,
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::list_low_stock,
        crate::handlers::checkin::check_in,
        crate::handlers::products::get_product_form,
        crate::handlers::products::update_product,
        crate::handlers::products::create_product,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,

            crate::handlers::orders::OrderResponse,
            crate::handlers::orders::LineItemResponse,
            crate::handlers::orders::OrderSummaryResponse,
            crate::handlers::orders::SubmitOrderResponse,
            crate::handlers::orders::ScanRequest,

            crate::handlers::inventory::ProductResponse,
            crate::handlers::inventory::CategoryResponse,
            crate::handlers::inventory::InventoryPageResponse,
            crate::handlers::inventory::LowStockPageResponse,

            crate::handlers::checkin::CheckInRequest,
            crate::handlers::checkin::CheckInResponse,

            crate::handlers::products::ProductFormResponse,
            crate::services::products::CreateProductInput,
            crate::services::products::UpdateProductInput,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_core_paths() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Stockroom API"));
        assert!(json.contains("/order/"));
        assert!(json.contains("/inventory/"));
        assert!(json.contains("/checkin/"));
    }
}
