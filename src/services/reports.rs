use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::{
    errors::ServiceError,
    repositories::report_repository::{
        GroupStat, HotProduct, LowStockItem, MovementTotals, ProductTotals, ReportSource, SaleRow,
    },
    services::{day_bounds, parse_filter_day, start_of_day, stock::StockMismatch},
};

pub const DEFAULT_REPORT_LIMIT: u64 = 10;
pub const MAX_REPORT_LIMIT: u64 = 100;
pub const MAX_TREND_DAYS: i64 = 365;

/// How many independent sections of a composite report failed
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportWarnings {
    pub failed: usize,
    pub total: usize,
    /// Names of the failed sections
    pub sections: Vec<String>,
}

/// A composite report: whatever could be computed, plus what could not.
#[derive(Debug, Clone)]
pub struct Report<T> {
    pub data: T,
    pub warnings: ReportWarnings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    #[serde(flatten)]
    pub products: ProductTotals,
    pub total_suppliers: u64,
}

/// Sales of one UTC calendar day
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub quantity: i64,
    pub amount: Decimal,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(flatten)]
    pub totals: InventoryStats,
    pub low_stock: Vec<LowStockItem>,
    pub hot_products: Vec<HotProduct>,
    pub category_stats: Vec<GroupStat>,
    pub brand_stats: Vec<GroupStat>,
    pub sales_trend: Vec<TrendPoint>,
    pub today: MovementTotals,
    pub generated_at: DateTime<Utc>,
}

/// Collects section outcomes, substituting defaults for failures.
#[derive(Debug, Default)]
struct SectionTracker {
    total: usize,
    failed: Vec<String>,
}

impl SectionTracker {
    fn take<T: Default>(&mut self, section: &str, result: Result<T, ServiceError>) -> T {
        self.total += 1;
        match result {
            Ok(value) => value,
            Err(e) => {
                error!(section, error = %e, "Report section failed; using empty default");
                self.failed.push(section.to_string());
                T::default()
            }
        }
    }

    fn into_warnings(self) -> ReportWarnings {
        ReportWarnings {
            failed: self.failed.len(),
            total: self.total,
            sections: self.failed,
        }
    }
}

/// Zero-filled daily sales for `days` days starting at `start`. Rows outside the
/// window are ignored.
pub fn bucket_sales(rows: &[SaleRow], start: NaiveDate, days: u32) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, TrendPoint> = start
        .iter_days()
        .take(days as usize)
        .map(|date| {
            (
                date,
                TrendPoint {
                    date,
                    quantity: 0,
                    amount: Decimal::ZERO,
                    orders: 0,
                },
            )
        })
        .collect();

    for row in rows {
        if let Some(point) = buckets.get_mut(&row.outbound_date.date_naive()) {
            point.quantity += i64::from(row.quantity);
            point.amount += row.total_amount;
            point.orders += 1;
        }
    }

    buckets.into_values().collect()
}

/// Read-only aggregations for the dashboard.
#[derive(Clone)]
pub struct ReportService {
    source: Arc<dyn ReportSource>,
    hot_days: i64,
    trend_days: i64,
}

impl ReportService {
    pub fn new(source: Arc<dyn ReportSource>, hot_days: i64, trend_days: i64) -> Self {
        Self {
            source,
            hot_days: hot_days.clamp(1, MAX_TREND_DAYS),
            trend_days: trend_days.clamp(1, MAX_TREND_DAYS),
        }
    }

    /// Headline stock figures; each half degrades independently.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Report<InventoryStats> {
        let (products, suppliers) =
            tokio::join!(self.source.product_totals(), self.source.supplier_count());

        let mut tracker = SectionTracker::default();
        let data = InventoryStats {
            products: tracker.take("productTotals", products),
            total_suppliers: tracker.take("supplierCount", suppliers),
        };
        Report {
            data,
            warnings: tracker.into_warnings(),
        }
    }

    /// Every dashboard section, computed concurrently and independently.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Report<Dashboard> {
        let now = Utc::now();
        let today = now.date_naive();
        let hot_from = start_of_day(today - Duration::days(self.hot_days - 1));
        let trend_start = today - Duration::days(self.trend_days - 1);
        let (today_from, today_to) = day_bounds(Some(today), Some(today));
        let today_from = today_from.unwrap_or(now);
        let today_to = today_to.unwrap_or(now);

        let (products, suppliers, low_stock, hot_products, categories, brands, sales, movements) = tokio::join!(
            self.source.product_totals(),
            self.source.supplier_count(),
            self.source.low_stock(DEFAULT_REPORT_LIMIT),
            self.source
                .hot_products(DEFAULT_REPORT_LIMIT, Some(hot_from), None),
            self.source.category_stats(),
            self.source.brand_stats(),
            self.source.sales_between(start_of_day(trend_start), today_to),
            self.source.movement_totals(today_from, today_to),
        );

        let mut tracker = SectionTracker::default();
        let totals = InventoryStats {
            products: tracker.take("productTotals", products),
            total_suppliers: tracker.take("supplierCount", suppliers),
        };
        let low_stock = tracker.take("lowStock", low_stock);
        let hot_products = tracker.take("hotProducts", hot_products);
        let category_stats = tracker.take("categoryStats", categories);
        let brand_stats = tracker.take("brandStats", brands);
        let sales = tracker.take("salesTrend", sales);
        let today_totals = tracker.take("todayMovements", movements);

        let warnings = tracker.into_warnings();
        if warnings.failed > 0 {
            info!(
                failed = warnings.failed,
                total = warnings.total,
                "Dashboard served with degraded sections"
            );
        }

        Report {
            data: Dashboard {
                totals,
                low_stock,
                hot_products,
                category_stats,
                brand_stats,
                sales_trend: bucket_sales(&sales, trend_start, self.trend_days as u32),
                today: today_totals,
                generated_at: now,
            },
            warnings,
        }
    }

    #[instrument(skip(self))]
    pub async fn low_stock(&self, limit: Option<u64>) -> Result<Vec<LowStockItem>, ServiceError> {
        self.source.low_stock(report_limit(limit)?).await
    }

    /// Best sellers within `[start, end]` days; defaults to the configured window.
    #[instrument(skip(self))]
    pub async fn hot_products(
        &self,
        limit: Option<u64>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<HotProduct>, ServiceError> {
        let limit = report_limit(limit)?;
        let start = parse_filter_day("startDate", start_date)?;
        let end = parse_filter_day("endDate", end_date)?;
        let (from, to) = match (start, end) {
            (None, None) => {
                let today = Utc::now().date_naive();
                day_bounds(Some(today - Duration::days(self.hot_days - 1)), None)
            }
            (Some(s), Some(e)) if s > e => {
                return Err(ServiceError::ValidationError(
                    "startDate must not be after endDate".to_string(),
                ))
            }
            (start, end) => day_bounds(start, end),
        };
        self.source.hot_products(limit, from, to).await
    }

    #[instrument(skip(self))]
    pub async fn category_stats(&self) -> Result<Vec<GroupStat>, ServiceError> {
        self.source.category_stats().await
    }

    #[instrument(skip(self))]
    pub async fn brand_stats(&self) -> Result<Vec<GroupStat>, ServiceError> {
        self.source.brand_stats().await
    }

    /// Daily sales over the trailing `days` (1..=365), today included.
    #[instrument(skip(self))]
    pub async fn sales_trend(&self, days: Option<i64>) -> Result<Vec<TrendPoint>, ServiceError> {
        let days = days.unwrap_or(self.trend_days);
        if !(1..=MAX_TREND_DAYS).contains(&days) {
            return Err(ServiceError::ValidationError(format!(
                "days must be between 1 and {}",
                MAX_TREND_DAYS
            )));
        }

        let today = Utc::now().date_naive();
        let start = today - Duration::days(days - 1);
        let (from, to) = day_bounds(Some(start), Some(today));
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(ServiceError::InternalError("date window overflow".to_string())),
        };

        let rows = self.source.sales_between(from, to).await?;
        Ok(bucket_sales(&rows, start, days as u32))
    }

    #[instrument(skip(self))]
    pub async fn stock_audit(&self) -> Result<Vec<StockMismatch>, ServiceError> {
        self.source.stock_audit().await
    }
}

fn report_limit(limit: Option<u64>) -> Result<u64, ServiceError> {
    match limit {
        None => Ok(DEFAULT_REPORT_LIMIT),
        Some(0) => Err(ServiceError::ValidationError(
            "limit must be greater than 0".to_string(),
        )),
        Some(limit) => Ok(limit.min(MAX_REPORT_LIMIT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sale(y: i32, m: u32, d: u32, h: u32, quantity: i32, amount: Decimal) -> SaleRow {
        SaleRow {
            outbound_date: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            quantity,
            total_amount: amount,
        }
    }

    #[test]
    fn trend_is_zero_filled_and_ascending() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let rows = vec![
            sale(2024, 3, 3, 23, 2, dec!(7.00)),
            sale(2024, 3, 1, 0, 1, dec!(3.50)),
            sale(2024, 3, 3, 1, 1, dec!(3.50)),
            sale(2024, 2, 29, 12, 9, dec!(99.00)),
        ];
        let trend = bucket_sales(&rows, start, 3);
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].date, start);
        assert_eq!(trend[0].quantity, 1);
        assert_eq!(trend[1].quantity, 0);
        assert_eq!(trend[1].amount, Decimal::ZERO);
        assert_eq!(trend[2].quantity, 3);
        assert_eq!(trend[2].amount, dec!(10.50));
        assert_eq!(trend[2].orders, 2);
    }

    #[test]
    fn tracker_counts_failures() {
        let mut tracker = SectionTracker::default();
        let ok: u64 = tracker.take("a", Ok(3));
        let failed: Vec<String> = tracker.take("b", Err(ServiceError::InternalError("x".into())));
        assert_eq!(ok, 3);
        assert!(failed.is_empty());
        let warnings = tracker.into_warnings();
        assert_eq!(warnings.failed, 1);
        assert_eq!(warnings.total, 2);
        assert_eq!(warnings.sections, vec!["b".to_string()]);
    }

    #[test]
    fn report_limit_defaults_and_caps() {
        assert_eq!(report_limit(None).unwrap(), DEFAULT_REPORT_LIMIT);
        assert_eq!(report_limit(Some(1000)).unwrap(), MAX_REPORT_LIMIT);
        assert!(report_limit(Some(0)).is_err());
    }
}
