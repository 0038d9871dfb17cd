use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{BaseRepository, Repository};
use crate::{
    entities::{
        inbound_record,
        outbound_record::{self, OutboundType},
        product::{self, ProductStatus},
        supplier, RecordStatus,
    },
    errors::ServiceError,
    services::stock::{StockMismatch, StockReconciler},
};

/// Catalogue-wide stock figures over active products
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductTotals {
    pub total_products: u64,
    pub active_products: u64,
    pub total_stock: i64,
    /// Σ current_stock × purchase_price
    pub stock_value: Decimal,
    pub low_stock_count: u64,
    pub out_of_stock_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub product_id: Uuid,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub unit: String,
    pub current_stock: i32,
    pub stock_alert: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotProduct {
    pub product_id: Uuid,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub unit: String,
    pub total_quantity: i64,
    pub total_amount: Decimal,
    pub record_count: u64,
}

/// Product count and stock for one category or brand
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupStat {
    pub name: String,
    pub product_count: u64,
    pub total_stock: i64,
}

/// One completed sale, as fed into the daily trend
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRow {
    pub outbound_date: DateTime<Utc>,
    pub quantity: i32,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementTotals {
    pub inbound_count: u64,
    pub inbound_quantity: i64,
    pub inbound_amount: Decimal,
    pub outbound_count: u64,
    pub outbound_quantity: i64,
    pub outbound_amount: Decimal,
}

/// Read-only queries behind the report endpoints. Voided movements never count.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn product_totals(&self) -> Result<ProductTotals, ServiceError>;

    async fn supplier_count(&self) -> Result<u64, ServiceError>;

    /// Active products at or below their threshold, emptiest first
    async fn low_stock(&self, limit: u64) -> Result<Vec<LowStockItem>, ServiceError>;

    /// Best sellers by outbound quantity within an optional date range
    async fn hot_products(
        &self,
        limit: u64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<HotProduct>, ServiceError>;

    async fn category_stats(&self) -> Result<Vec<GroupStat>, ServiceError>;

    async fn brand_stats(&self) -> Result<Vec<GroupStat>, ServiceError>;

    /// Sales (`outbound_type = sale`) with `from <= date < to`
    async fn sales_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SaleRow>, ServiceError>;

    /// Inbound and outbound volumes with `from <= date < to`
    async fn movement_totals(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<MovementTotals, ServiceError>;

    async fn stock_audit(&self) -> Result<Vec<StockMismatch>, ServiceError>;
}

/// `ReportSource` over the application database
#[derive(Debug, Clone)]
pub struct SeaOrmReportSource {
    base: BaseRepository,
}

impl SeaOrmReportSource {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn active_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        product::Entity::find()
            .filter(product::Column::Status.eq(ProductStatus::Active))
            .all(self.base.get_db())
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl ReportSource for SeaOrmReportSource {
    async fn product_totals(&self) -> Result<ProductTotals, ServiceError> {
        let products = product::Entity::find().all(self.base.get_db()).await?;
        Ok(summarize_products(&products))
    }

    async fn supplier_count(&self) -> Result<u64, ServiceError> {
        supplier::Entity::find()
            .count(self.base.get_db())
            .await
            .map_err(Into::into)
    }

    async fn low_stock(&self, limit: u64) -> Result<Vec<LowStockItem>, ServiceError> {
        let products = product::Entity::find()
            .filter(product::Column::Status.eq(ProductStatus::Active))
            .filter(product::Column::StockAlert.is_not_null())
            .filter(
                Expr::col(product::Column::CurrentStock)
                    .lte(Expr::col(product::Column::StockAlert)),
            )
            .order_by_asc(product::Column::CurrentStock)
            .order_by_asc(product::Column::Name)
            .limit(limit)
            .all(self.base.get_db())
            .await?;

        Ok(products
            .into_iter()
            .filter_map(|p| {
                let stock_alert = p.stock_alert?;
                Some(LowStockItem {
                    product_id: p.id,
                    name: p.name,
                    brand: p.brand,
                    category: p.category,
                    unit: p.unit,
                    current_stock: p.current_stock,
                    stock_alert,
                })
            })
            .collect())
    }

    async fn hot_products(
        &self,
        limit: u64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<HotProduct>, ServiceError> {
        let mut query = outbound_record::Entity::find()
            .select_only()
            .column(outbound_record::Column::ProductId)
            .column(outbound_record::Column::Quantity)
            .column(outbound_record::Column::TotalAmount)
            .filter(outbound_record::Column::Status.eq(RecordStatus::Completed));
        if let Some(from) = from {
            query = query.filter(outbound_record::Column::OutboundDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(outbound_record::Column::OutboundDate.lt(to));
        }
        let rows: Vec<(Uuid, i32, Decimal)> = query.into_tuple().all(self.base.get_db()).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows
            .iter()
            .map(|(id, _, _)| *id)
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();
        let products: HashMap<Uuid, product::Model> = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(self.base.get_db())
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(rank_hot_products(rows, &products, limit))
    }

    async fn category_stats(&self) -> Result<Vec<GroupStat>, ServiceError> {
        let products = self.active_products().await?;
        Ok(group_products(&products, |p| &p.category))
    }

    async fn brand_stats(&self) -> Result<Vec<GroupStat>, ServiceError> {
        let products = self.active_products().await?;
        Ok(group_products(&products, |p| &p.brand))
    }

    async fn sales_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SaleRow>, ServiceError> {
        let rows: Vec<(DateTime<Utc>, i32, Decimal)> = outbound_record::Entity::find()
            .select_only()
            .column(outbound_record::Column::OutboundDate)
            .column(outbound_record::Column::Quantity)
            .column(outbound_record::Column::TotalAmount)
            .filter(outbound_record::Column::Status.eq(RecordStatus::Completed))
            .filter(outbound_record::Column::OutboundType.eq(OutboundType::Sale))
            .filter(outbound_record::Column::OutboundDate.gte(from))
            .filter(outbound_record::Column::OutboundDate.lt(to))
            .order_by_asc(outbound_record::Column::OutboundDate)
            .into_tuple()
            .all(self.base.get_db())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(outbound_date, quantity, total_amount)| SaleRow {
                outbound_date,
                quantity,
                total_amount,
            })
            .collect())
    }

    async fn movement_totals(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<MovementTotals, ServiceError> {
        let inbound: Vec<(i32, Decimal)> = inbound_record::Entity::find()
            .select_only()
            .column(inbound_record::Column::Quantity)
            .column(inbound_record::Column::TotalAmount)
            .filter(inbound_record::Column::Status.eq(RecordStatus::Completed))
            .filter(inbound_record::Column::InboundDate.gte(from))
            .filter(inbound_record::Column::InboundDate.lt(to))
            .into_tuple()
            .all(self.base.get_db())
            .await?;

        let outbound: Vec<(i32, Decimal)> = outbound_record::Entity::find()
            .select_only()
            .column(outbound_record::Column::Quantity)
            .column(outbound_record::Column::TotalAmount)
            .filter(outbound_record::Column::Status.eq(RecordStatus::Completed))
            .filter(outbound_record::Column::OutboundDate.gte(from))
            .filter(outbound_record::Column::OutboundDate.lt(to))
            .into_tuple()
            .all(self.base.get_db())
            .await?;

        Ok(MovementTotals {
            inbound_count: inbound.len() as u64,
            inbound_quantity: inbound.iter().map(|(q, _)| i64::from(*q)).sum(),
            inbound_amount: inbound.iter().map(|(_, a)| *a).sum(),
            outbound_count: outbound.len() as u64,
            outbound_quantity: outbound.iter().map(|(q, _)| i64::from(*q)).sum(),
            outbound_amount: outbound.iter().map(|(_, a)| *a).sum(),
        })
    }

    async fn stock_audit(&self) -> Result<Vec<StockMismatch>, ServiceError> {
        StockReconciler::audit(self.base.get_db()).await
    }
}

/// Totals over the whole catalogue; stock figures only count active products.
pub fn summarize_products(products: &[product::Model]) -> ProductTotals {
    let mut totals = ProductTotals {
        total_products: products.len() as u64,
        ..Default::default()
    };
    for p in products
        .iter()
        .filter(|p| p.status == ProductStatus::Active)
    {
        totals.active_products += 1;
        totals.total_stock += i64::from(p.current_stock);
        totals.stock_value += Decimal::from(p.current_stock) * p.purchase_price;
        if p.current_stock == 0 {
            totals.out_of_stock_count += 1;
        }
        if p.is_low_stock() {
            totals.low_stock_count += 1;
        }
    }
    totals
}

/// Groups products by a key, largest groups first, ties by name.
pub fn group_products<F>(products: &[product::Model], key: F) -> Vec<GroupStat>
where
    F: Fn(&product::Model) -> &String,
{
    let mut groups: HashMap<&str, (u64, i64)> = HashMap::new();
    for p in products {
        let entry = groups.entry(key(p).as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += i64::from(p.current_stock);
    }

    let mut stats: Vec<GroupStat> = groups
        .into_iter()
        .map(|(name, (product_count, total_stock))| GroupStat {
            name: name.to_string(),
            product_count,
            total_stock,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.product_count
            .cmp(&a.product_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    stats
}

/// Sums outbound rows per product and ranks them by quantity. Rows whose product
/// is gone are skipped.
pub fn rank_hot_products(
    rows: Vec<(Uuid, i32, Decimal)>,
    products: &HashMap<Uuid, product::Model>,
    limit: u64,
) -> Vec<HotProduct> {
    let mut sums: HashMap<Uuid, (i64, Decimal, u64)> = HashMap::new();
    for (product_id, quantity, amount) in rows {
        let entry = sums
            .entry(product_id)
            .or_insert((0, Decimal::ZERO, 0));
        entry.0 += i64::from(quantity);
        entry.1 += amount;
        entry.2 += 1;
    }

    let mut ranked: Vec<HotProduct> = sums
        .into_iter()
        .filter_map(|(product_id, (total_quantity, total_amount, record_count))| {
            let p = products.get(&product_id)?;
            Some(HotProduct {
                product_id,
                name: p.name.clone(),
                brand: p.brand.clone(),
                category: p.category.clone(),
                unit: p.unit.clone(),
                total_quantity,
                total_amount,
                record_count,
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then_with(|| b.total_amount.cmp(&a.total_amount))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(name: &str, brand: &str, category: &str, stock: i32) -> product::Model {
        product::Model {
            id: Uuid::new_v4(),
            name: name.into(),
            brand: brand.into(),
            category: category.into(),
            unit: product::DEFAULT_UNIT.into(),
            barcode: None,
            purchase_price: dec!(2.00),
            retail_price: dec!(3.00),
            input_price: Decimal::ZERO,
            current_stock: stock,
            stock_alert: Some(5),
            status: ProductStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn summary_ignores_inactive_stock() {
        let mut retired = product("旧款", "A", "零食", 40);
        retired.status = ProductStatus::Inactive;
        let products = vec![
            product("可乐", "A", "饮料", 10),
            product("雪碧", "A", "饮料", 3),
            product("薯片", "B", "零食", 0),
            retired,
        ];
        let totals = summarize_products(&products);
        assert_eq!(totals.total_products, 4);
        assert_eq!(totals.active_products, 3);
        assert_eq!(totals.total_stock, 13);
        assert_eq!(totals.stock_value, dec!(26.00));
        assert_eq!(totals.low_stock_count, 2);
        assert_eq!(totals.out_of_stock_count, 1);
    }

    #[test]
    fn groups_sort_by_size_then_name() {
        let products = vec![
            product("可乐", "A", "饮料", 10),
            product("雪碧", "A", "饮料", 3),
            product("薯片", "B", "零食", 7),
        ];
        let stats = group_products(&products, |p| &p.category);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "饮料");
        assert_eq!(stats[0].product_count, 2);
        assert_eq!(stats[0].total_stock, 13);
        assert_eq!(stats[1].total_stock, 7);
    }

    #[test]
    fn hot_products_rank_by_quantity_and_skip_orphans() {
        let cola = product("可乐", "A", "饮料", 10);
        let chips = product("薯片", "B", "零食", 7);
        let orphan = Uuid::new_v4();
        let products: HashMap<Uuid, product::Model> =
            [(cola.id, cola.clone()), (chips.id, chips.clone())].into();

        let rows = vec![
            (cola.id, 3, dec!(9.00)),
            (chips.id, 5, dec!(25.00)),
            (cola.id, 4, dec!(12.00)),
            (orphan, 100, dec!(1.00)),
        ];
        let ranked = rank_hot_products(rows, &products, 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].product_id, cola.id);
        assert_eq!(ranked[0].total_quantity, 7);
        assert_eq!(ranked[0].total_amount, dec!(21.00));
        assert_eq!(ranked[0].record_count, 2);
        assert_eq!(ranked[1].product_id, chips.id);

        let top = rank_hot_products(vec![(cola.id, 1, dec!(1)), (chips.id, 2, dec!(2))], &products, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].product_id, chips.id);
    }
}
