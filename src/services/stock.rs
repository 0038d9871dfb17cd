use crate::{
    entities::{
        inbound_record, outbound_record,
        product::{self, Entity as Product},
        RecordStatus,
    },
    errors::ServiceError,
    events::Event,
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Outcome of one committed stock mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: Uuid,
    /// Delta actually applied; smaller than requested when a floored update clamps.
    pub delta: i32,
    pub before: i32,
    pub after: i32,
    pub stock_alert: Option<i32>,
}

impl StockChange {
    /// A decrease that leaves the product at or below its threshold.
    pub fn reached_low_stock(&self) -> bool {
        self.delta < 0
            && self
                .stock_alert
                .map(|alert| self.after <= alert)
                .unwrap_or(false)
    }

    /// Events describing this change, to be sent once the transaction commits.
    pub fn events(&self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.delta != 0 {
            events.push(Event::StockAdjusted {
                product_id: self.product_id,
                delta: self.delta,
                old_stock: self.before,
                new_stock: self.after,
                occurred_at: Utc::now(),
            });
        }
        if self.reached_low_stock() {
            if let Some(alert) = self.stock_alert {
                events.push(Event::LowStockReached {
                    product_id: self.product_id,
                    current_stock: self.after,
                    stock_alert: alert,
                });
            }
        }
        events
    }
}

/// A product whose stored stock disagrees with its movement history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMismatch {
    pub product_id: Uuid,
    pub name: String,
    pub brand: String,
    pub current_stock: i32,
    pub expected_stock: i64,
    pub inbound_total: i64,
    pub outbound_total: i64,
}

/// The only writer of `products.current_stock`.
///
/// Every method runs on the connection it is handed, so a movement service passes
/// its open transaction and the stock change commits or rolls back with the record.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockReconciler;

impl StockReconciler {
    /// Adds `delta` to the product's stock in one conditional statement.
    ///
    /// Nothing is written when the result would be negative; the error carries the
    /// stock observed at that moment.
    #[instrument(skip(conn))]
    pub async fn apply<C>(conn: &C, product_id: Uuid, delta: i32) -> Result<StockChange, ServiceError>
    where
        C: ConnectionTrait,
    {
        if delta == 0 {
            let current = Self::load(conn, product_id).await?;
            return Ok(StockChange {
                product_id,
                delta: 0,
                before: current.current_stock,
                after: current.current_stock,
                stock_alert: current.stock_alert,
            });
        }

        let update = Product::update_many()
            .col_expr(
                product::Column::CurrentStock,
                Expr::col(product::Column::CurrentStock).add(delta),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(product_id));
        // The stock column is a 32-bit integer in both directions
        let update = if delta < 0 {
            update.filter(Expr::col(product::Column::CurrentStock).gte(-i64::from(delta)))
        } else {
            update.filter(
                Expr::col(product::Column::CurrentStock)
                    .lte(i64::from(i32::MAX) - i64::from(delta)),
            )
        };
        let result = update.exec(conn).await?;

        if result.rows_affected == 0 {
            let current = Self::load(conn, product_id).await?;
            if delta > 0 {
                warn!(
                    %product_id,
                    current_stock = current.current_stock,
                    delta,
                    "Rejected stock change: stock ceiling exceeded"
                );
                return Err(ServiceError::ValidationError(format!(
                    "Stock of product {} would exceed {} (current {}, adding {})",
                    product_id,
                    i32::MAX,
                    current.current_stock,
                    delta
                )));
            }
            warn!(
                %product_id,
                current_stock = current.current_stock,
                requested = -delta,
                "Rejected stock change: insufficient stock"
            );
            return Err(ServiceError::InsufficientStock {
                product_id,
                current: current.current_stock,
                requested: -delta,
            });
        }

        let updated = Self::load(conn, product_id).await?;
        let change = StockChange {
            product_id,
            delta,
            before: updated.current_stock - delta,
            after: updated.current_stock,
            stock_alert: updated.stock_alert,
        };
        info!(
            %product_id,
            delta,
            before = change.before,
            after = change.after,
            "Stock updated"
        );
        Ok(change)
    }

    /// Adds `delta`, clamping the result at zero instead of failing.
    ///
    /// Only inbound reversals use this: taking back a receipt whose goods were
    /// already sold leaves the shelf empty rather than negative.
    #[instrument(skip(conn))]
    pub async fn apply_floored<C>(
        conn: &C,
        product_id: Uuid,
        delta: i32,
    ) -> Result<StockChange, ServiceError>
    where
        C: ConnectionTrait,
    {
        let current = Self::load(conn, product_id).await?;

        let result = Product::update_many()
            .col_expr(
                product::Column::CurrentStock,
                Expr::cust_with_values(
                    "CASE WHEN current_stock + ? < 0 THEN 0 ELSE current_stock + ? END",
                    [delta, delta],
                ),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(product_id))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Product", product_id));
        }

        let updated = Self::load(conn, product_id).await?;
        let change = StockChange {
            product_id,
            delta: updated.current_stock - current.current_stock,
            before: current.current_stock,
            after: updated.current_stock,
            stock_alert: updated.stock_alert,
        };
        if change.delta != delta {
            warn!(
                %product_id,
                requested = delta,
                applied = change.delta,
                "Stock reversal clamped at zero"
            );
        } else {
            info!(
                %product_id,
                delta,
                before = change.before,
                after = change.after,
                "Stock updated"
            );
        }
        Ok(change)
    }

    /// Recomputes `Σ inbound − Σ outbound` over completed movements and returns
    /// every product whose stored stock differs from `max(0, net)`.
    #[instrument(skip(conn))]
    pub async fn audit<C>(conn: &C) -> Result<Vec<StockMismatch>, ServiceError>
    where
        C: ConnectionTrait,
    {
        let inbound: Vec<(Uuid, i32)> = inbound_record::Entity::find()
            .select_only()
            .column(inbound_record::Column::ProductId)
            .column(inbound_record::Column::Quantity)
            .filter(inbound_record::Column::Status.eq(RecordStatus::Completed))
            .into_tuple()
            .all(conn)
            .await?;

        let outbound: Vec<(Uuid, i32)> = outbound_record::Entity::find()
            .select_only()
            .column(outbound_record::Column::ProductId)
            .column(outbound_record::Column::Quantity)
            .filter(outbound_record::Column::Status.eq(RecordStatus::Completed))
            .into_tuple()
            .all(conn)
            .await?;

        let inbound_totals = sum_by_product(inbound);
        let outbound_totals = sum_by_product(outbound);

        let products = Product::find()
            .order_by_asc(product::Column::Name)
            .all(conn)
            .await?;

        let mismatches: Vec<StockMismatch> = products
            .into_iter()
            .filter_map(|p| {
                let inbound_total = inbound_totals.get(&p.id).copied().unwrap_or(0);
                let outbound_total = outbound_totals.get(&p.id).copied().unwrap_or(0);
                let expected_stock = (inbound_total - outbound_total).max(0);
                (i64::from(p.current_stock) != expected_stock).then(|| StockMismatch {
                    product_id: p.id,
                    name: p.name,
                    brand: p.brand,
                    current_stock: p.current_stock,
                    expected_stock,
                    inbound_total,
                    outbound_total,
                })
            })
            .collect();

        if !mismatches.is_empty() {
            warn!(count = mismatches.len(), "Stock audit found mismatches");
        }
        Ok(mismatches)
    }

    async fn load<C>(conn: &C, product_id: Uuid) -> Result<product::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        Product::find_by_id(product_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))
    }
}

fn sum_by_product(rows: Vec<(Uuid, i32)>) -> HashMap<Uuid, i64> {
    let mut totals = HashMap::new();
    for (product_id, quantity) in rows {
        *totals.entry(product_id).or_insert(0i64) += i64::from(quantity);
    }
    totals
}
