use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StoreLedger API",
        version = "0.1.0",
        description = r#"
# StoreLedger Inventory API

Inventory ledger for a convenience store: product master data, suppliers,
inbound and outbound stock movements, and dashboard reports.

## Stock

A product's `currentStock` is never written directly. It changes only when
inbound or outbound records are created, edited, deleted or voided. An outbound
movement that would take stock below zero is rejected with `400`.

## Error Handling

Every error uses the same envelope:

```json
{
  "success": false,
  "error": "Bad Request",
  "message": "库存不足，当前库存：20，需要出库：25",
  "details": { "currentStock": 20, "requested": 25 },
  "requestId": "2f6c1f2e-...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20, max 100) and
return `pagination: {current, pageSize, total, pages}`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Product master data"),
        (name = "Suppliers", description = "Supplier registry"),
        (name = "Inbound", description = "Goods received"),
        (name = "Outbound", description = "Goods leaving the store"),
        (name = "Reports", description = "Read-only aggregations"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::list_categories,
        crate::handlers::products::list_brands,

        // Suppliers
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,

        // Movements
        crate::handlers::inbound::list_inbound,
        crate::handlers::inbound::get_inbound,
        crate::handlers::inbound::create_inbound,
        crate::handlers::inbound::update_inbound,
        crate::handlers::inbound::delete_inbound,
        crate::handlers::inbound::void_inbound,
        crate::handlers::outbound::list_outbound,
        crate::handlers::outbound::get_outbound,
        crate::handlers::outbound::create_outbound,
        crate::handlers::outbound::update_outbound,
        crate::handlers::outbound::delete_outbound,
        crate::handlers::outbound::void_outbound,

        // Reports
        crate::handlers::reports::get_stats,
        crate::handlers::reports::get_dashboard,
        crate::handlers::reports::get_low_stock,
        crate::handlers::reports::get_hot_products,
        crate::handlers::reports::get_category_stats,
        crate::handlers::reports::get_brand_stats,
        crate::handlers::reports::get_sales_trend,
        crate::handlers::reports::get_stock_audit,

        // Health
        crate::health::health_check,
        crate::health::status_check,
    ),
    components(
        schemas(
            crate::handlers::common::PaginationMeta,
            crate::dto::products::CreateProductRequest,
            crate::dto::products::UpdateProductRequest,
            crate::dto::products::ProductResponse,
            crate::dto::suppliers::CreateSupplierRequest,
            crate::dto::suppliers::UpdateSupplierRequest,
            crate::dto::suppliers::SupplierResponse,
            crate::dto::movements::CreateInboundRequest,
            crate::dto::movements::UpdateInboundRequest,
            crate::dto::movements::InboundResponse,
            crate::dto::movements::CreateOutboundRequest,
            crate::dto::movements::UpdateOutboundRequest,
            crate::dto::movements::OutboundResponse,
            crate::entities::product::ProductStatus,
            crate::entities::supplier::PaymentMethod,
            crate::entities::supplier::SupplierStatus,
            crate::entities::outbound_record::OutboundType,
            crate::entities::RecordStatus,
            crate::services::reports::ReportWarnings,
            crate::health::StatusReport,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDocV1::openapi())
}
