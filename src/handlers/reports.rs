use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    errors::ServiceError,
    handlers::{common::AppQuery, AppState},
    repositories::report_repository::{GroupStat, HotProduct, LowStockItem},
    services::{
        reports::{Dashboard, InventoryStats, Report, ReportWarnings, TrendPoint},
        stock::StockMismatch,
    },
    ApiResponse,
};

/// Composite report envelope; `warnings` lists sections that fell back to defaults.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse<T> {
    pub success: bool,
    pub data: T,
    pub warnings: ReportWarnings,
}

impl<T> From<Report<T>> for ReportResponse<T> {
    fn from(report: Report<T>) -> Self {
        Self {
            success: true,
            data: report.data,
            warnings: report.warnings,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Maximum rows (default 10, capped at 100)
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HotProductsQuery {
    pub limit: Option<u64>,
    /// First day, inclusive (`YYYY-MM-DD`)
    pub start_date: Option<String>,
    /// Last day, inclusive (`YYYY-MM-DD`)
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendQuery {
    /// Trailing window in days, 1..=365
    pub days: Option<i64>,
}

pub fn reports_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/dashboard", get(get_dashboard))
        .route("/low-stock", get(get_low_stock))
        .route("/hot-products", get(get_hot_products))
        .route("/categories", get(get_category_stats))
        .route("/brands", get(get_brand_stats))
        .route("/sales-trend", get(get_sales_trend))
        .route("/stock-audit", get(get_stock_audit))
}

/// Headline inventory totals
#[utoipa::path(
    get,
    path = "/api/v1/reports/stats",
    responses((status = 200, description = "Inventory totals", body = ReportResponse<InventoryStats>)),
    tag = "Reports"
)]
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(ReportResponse::from(state.services.reports.stats().await))
}

/// Everything the dashboard shows in one call
#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    responses((status = 200, description = "Dashboard", body = ReportResponse<Dashboard>)),
    tag = "Reports"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    Json(ReportResponse::from(state.services.reports.dashboard().await))
}

/// Active products at or below their stock alert
#[utoipa::path(
    get,
    path = "/api/v1/reports/low-stock",
    params(LimitQuery),
    responses(
        (status = 200, description = "Low-stock products", body = crate::ApiResponse<Vec<LowStockItem>>),
        (status = 400, description = "Invalid limit", body = crate::errors::ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_low_stock(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LimitQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.reports.low_stock(query.limit).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Best sellers by outbound quantity
#[utoipa::path(
    get,
    path = "/api/v1/reports/hot-products",
    params(HotProductsQuery),
    responses(
        (status = 200, description = "Hot products", body = crate::ApiResponse<Vec<HotProduct>>),
        (status = 400, description = "Invalid limit or date range", body = crate::errors::ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_hot_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<HotProductsQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state
        .services
        .reports
        .hot_products(
            query.limit,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/categories",
    responses((status = 200, description = "Active products per category", body = crate::ApiResponse<Vec<GroupStat>>)),
    tag = "Reports"
)]
pub async fn get_category_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let stats = state.services.reports.category_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/brands",
    responses((status = 200, description = "Active products per brand", body = crate::ApiResponse<Vec<GroupStat>>)),
    tag = "Reports"
)]
pub async fn get_brand_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let stats = state.services.reports.brand_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// Daily sales, zero-filled, oldest day first
#[utoipa::path(
    get,
    path = "/api/v1/reports/sales-trend",
    params(TrendQuery),
    responses(
        (status = 200, description = "Sales trend", body = crate::ApiResponse<Vec<TrendPoint>>),
        (status = 400, description = "Invalid window", body = crate::errors::ErrorResponse)
    ),
    tag = "Reports"
)]
pub async fn get_sales_trend(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TrendQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let trend = state.services.reports.sales_trend(query.days).await?;
    Ok(Json(ApiResponse::success(trend)))
}

/// Products whose stock disagrees with their movement history
#[utoipa::path(
    get,
    path = "/api/v1/reports/stock-audit",
    responses((status = 200, description = "Mismatching products", body = crate::ApiResponse<Vec<StockMismatch>>)),
    tag = "Reports"
)]
pub async fn get_stock_audit(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let mismatches = state.services.reports.stock_audit().await?;
    Ok(Json(ApiResponse::success(mismatches)))
}
