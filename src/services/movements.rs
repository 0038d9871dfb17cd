use crate::{
    entities::{
        inbound_record::{self, Entity as InboundRecord},
        outbound_record::{self, Entity as OutboundRecord, OutboundType},
        product, supplier, RecordStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender, MovementKind, ReversalKind},
    services::{
        day_bounds, ensure_price, optional_text, parse_filter_day, parse_movement_date,
        stock::{StockChange, StockReconciler},
        Page, PageRequest,
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Product display fields attached to movement records
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub unit: String,
}

impl From<&product::Model> for ProductRef {
    fn from(p: &product::Model) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            brand: p.brand.clone(),
            unit: p.unit.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplierRef {
    pub id: Uuid,
    pub name: String,
}

/// An inbound record with its product and supplier resolved
#[derive(Debug, Clone)]
pub struct InboundView {
    pub record: inbound_record::Model,
    pub product: Option<ProductRef>,
    pub supplier: Option<SupplierRef>,
}

/// An outbound record with its product resolved
#[derive(Debug, Clone)]
pub struct OutboundView {
    pub record: outbound_record::Model,
    pub product: Option<ProductRef>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateInboundInput {
    pub product_id: Uuid,
    pub supplier_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// RFC 3339 or `YYYY-MM-DD`; defaults to now
    pub inbound_date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateInboundInput {
    pub product_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub inbound_date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InboundFilter {
    pub product_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub status: Option<RecordStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOutboundInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// RFC 3339 or `YYYY-MM-DD`; defaults to now
    pub outbound_date: Option<String>,
    pub outbound_type: Option<OutboundType>,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOutboundInput {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub outbound_date: Option<String>,
    pub outbound_type: Option<OutboundType>,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OutboundFilter {
    pub product_id: Option<Uuid>,
    pub outbound_type: Option<OutboundType>,
    pub status: Option<RecordStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// `quantity × unit_price`; exact because prices carry at most two decimal places
pub fn total_amount(quantity: i32, unit_price: Decimal) -> Decimal {
    (Decimal::from(quantity) * unit_price).round_dp(2)
}

/// Inbound and outbound ledgers. Every write runs in one transaction together with
/// the stock change it implies.
#[derive(Clone)]
pub struct MovementService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl MovementService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Record a receipt of goods and add its quantity to stock
    #[instrument(skip(self))]
    pub async fn create_inbound(
        &self,
        input: CreateInboundInput,
    ) -> Result<InboundView, ServiceError> {
        ensure_quantity(input.quantity)?;
        ensure_price("unitPrice", input.unit_price)?;
        let inbound_date = movement_date(input.inbound_date.as_deref())?;

        let record_id = Uuid::new_v4();
        let product_id = input.product_id;
        let supplier_id = input.supplier_id;
        let quantity = input.quantity;
        let model = inbound_record::ActiveModel {
            id: Set(record_id),
            product_id: Set(product_id),
            supplier_id: Set(supplier_id),
            quantity: Set(quantity),
            unit_price: Set(input.unit_price),
            total_amount: Set(total_amount(quantity, input.unit_price)),
            inbound_date: Set(inbound_date),
            notes: Set(optional_text(input.notes)),
            status: Set(RecordStatus::Completed),
            ..Default::default()
        };

        let (record, change) = self
            .db
            .transaction::<_, (inbound_record::Model, StockChange), ServiceError>(move |txn| {
                Box::pin(async move {
                    require_product(txn, product_id).await?;
                    require_supplier(txn, supplier_id).await?;
                    let record = model.insert(txn).await?;
                    let change = StockReconciler::apply(txn, product_id, quantity).await?;
                    Ok((record, change))
                })
            })
            .await?;

        let mut events = vec![Event::InboundRecorded {
            record_id,
            product_id,
            supplier_id,
            quantity,
        }];
        events.extend(change.events());
        self.event_sender.send_all(events).await;

        info!(%record_id, %product_id, quantity, "Recorded inbound");
        self.inbound_view(record).await
    }

    #[instrument(skip(self))]
    pub async fn get_inbound(&self, record_id: Uuid) -> Result<InboundView, ServiceError> {
        let record = InboundRecord::find_by_id(record_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Inbound record", record_id))?;
        self.inbound_view(record).await
    }

    /// List inbound records, latest movement first
    #[instrument(skip(self))]
    pub async fn list_inbound(
        &self,
        filter: InboundFilter,
        page: PageRequest,
    ) -> Result<Page<InboundView>, ServiceError> {
        let (from, to) = date_range(filter.start_date.as_deref(), filter.end_date.as_deref())?;

        let mut query = InboundRecord::find();
        if let Some(product_id) = filter.product_id {
            query = query.filter(inbound_record::Column::ProductId.eq(product_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(inbound_record::Column::SupplierId.eq(supplier_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(inbound_record::Column::Status.eq(status));
        }
        if let Some(from) = from {
            query = query.filter(inbound_record::Column::InboundDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(inbound_record::Column::InboundDate.lt(to));
        }

        let total = query.clone().count(&*self.db).await?;
        let records = query
            .order_by_desc(inbound_record::Column::InboundDate)
            .order_by_desc(inbound_record::Column::CreatedAt)
            .limit(page.page_size)
            .offset(page.offset())
            .all(&*self.db)
            .await?;

        Ok(Page {
            items: self.populate_inbound(records).await?,
            total,
            request: page,
        })
    }

    /// Edit an inbound record, shifting stock by the quantity difference
    #[instrument(skip(self))]
    pub async fn update_inbound(
        &self,
        record_id: Uuid,
        input: UpdateInboundInput,
    ) -> Result<InboundView, ServiceError> {
        if let Some(quantity) = input.quantity {
            ensure_quantity(quantity)?;
        }
        if let Some(price) = input.unit_price {
            ensure_price("unitPrice", price)?;
        }
        let inbound_date = input
            .inbound_date
            .as_deref()
            .map(parse_movement_date)
            .transpose()?;

        let (record, changes) = self
            .db
            .transaction::<_, (inbound_record::Model, Vec<StockChange>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let existing = InboundRecord::find_by_id(record_id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| ServiceError::not_found("Inbound record", record_id))?;
                        if existing.status.is_voided() {
                            return Err(ServiceError::ValidationError(format!(
                                "Inbound record {} is voided and cannot be updated",
                                record_id
                            )));
                        }

                        let new_product = input.product_id.unwrap_or(existing.product_id);
                        let new_supplier = input.supplier_id.unwrap_or(existing.supplier_id);
                        if new_product != existing.product_id {
                            require_product(txn, new_product).await?;
                        }
                        if new_supplier != existing.supplier_id {
                            require_supplier(txn, new_supplier).await?;
                        }
                        let new_quantity = input.quantity.unwrap_or(existing.quantity);
                        let new_price = input.unit_price.unwrap_or(existing.unit_price);

                        let mut changes = Vec::new();
                        if new_product != existing.product_id {
                            changes.push(
                                StockReconciler::apply(
                                    txn,
                                    existing.product_id,
                                    -existing.quantity,
                                )
                                .await
                                .map_err(ServiceError::into_inbound_adjustment)?,
                            );
                            changes
                                .push(StockReconciler::apply(txn, new_product, new_quantity).await?);
                        } else if new_quantity != existing.quantity {
                            changes.push(
                                StockReconciler::apply(
                                    txn,
                                    new_product,
                                    new_quantity - existing.quantity,
                                )
                                .await
                                .map_err(ServiceError::into_inbound_adjustment)?,
                            );
                        }

                        let mut active: inbound_record::ActiveModel = existing.into();
                        active.product_id = Set(new_product);
                        active.supplier_id = Set(new_supplier);
                        active.quantity = Set(new_quantity);
                        active.unit_price = Set(new_price);
                        active.total_amount = Set(total_amount(new_quantity, new_price));
                        if let Some(date) = inbound_date {
                            active.inbound_date = Set(date);
                        }
                        if input.notes.is_some() {
                            active.notes = Set(optional_text(input.notes));
                        }
                        let record = active.update(txn).await?;
                        Ok((record, changes))
                    })
                },
            )
            .await?;

        self.event_sender
            .send_all(changes.iter().flat_map(StockChange::events))
            .await;

        info!(%record_id, "Updated inbound record");
        self.inbound_view(record).await
    }

    /// Remove an inbound record and take its quantity back out of stock (floored at 0)
    #[instrument(skip(self))]
    pub async fn delete_inbound(&self, record_id: Uuid) -> Result<(), ServiceError> {
        let (record, change) = self
            .db
            .transaction::<_, (inbound_record::Model, Option<StockChange>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let existing = find_inbound(txn, record_id).await?;
                        let change = reverse_inbound(txn, &existing).await?;
                        InboundRecord::delete_by_id(record_id).exec(txn).await?;
                        Ok((existing, change))
                    })
                },
            )
            .await?;

        self.emit_reversal(
            MovementKind::Inbound,
            record.id,
            record.product_id,
            ReversalKind::Deleted,
            change,
        )
        .await;

        info!(%record_id, "Deleted inbound record");
        Ok(())
    }

    /// Keep an inbound record for the audit trail but cancel its stock effect
    #[instrument(skip(self))]
    pub async fn void_inbound(&self, record_id: Uuid) -> Result<InboundView, ServiceError> {
        let (record, change) = self
            .db
            .transaction::<_, (inbound_record::Model, Option<StockChange>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let existing = find_inbound(txn, record_id).await?;
                        if existing.status.is_voided() {
                            return Err(ServiceError::ValidationError(format!(
                                "Inbound record {} is already voided",
                                record_id
                            )));
                        }
                        let change = reverse_inbound(txn, &existing).await?;
                        let mut active: inbound_record::ActiveModel = existing.into();
                        active.status = Set(RecordStatus::Voided);
                        let record = active.update(txn).await?;
                        Ok((record, change))
                    })
                },
            )
            .await?;

        self.emit_reversal(
            MovementKind::Inbound,
            record.id,
            record.product_id,
            ReversalKind::Voided,
            change,
        )
        .await;

        info!(%record_id, "Voided inbound record");
        self.inbound_view(record).await
    }

    /// Record goods leaving the store; rejected without a trace when stock is short
    #[instrument(skip(self))]
    pub async fn create_outbound(
        &self,
        input: CreateOutboundInput,
    ) -> Result<OutboundView, ServiceError> {
        ensure_quantity(input.quantity)?;
        ensure_price("unitPrice", input.unit_price)?;
        let outbound_date = movement_date(input.outbound_date.as_deref())?;

        let record_id = Uuid::new_v4();
        let product_id = input.product_id;
        let quantity = input.quantity;
        let outbound_type = input.outbound_type.unwrap_or_default();
        let model = outbound_record::ActiveModel {
            id: Set(record_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            unit_price: Set(input.unit_price),
            total_amount: Set(total_amount(quantity, input.unit_price)),
            outbound_date: Set(outbound_date),
            outbound_type: Set(outbound_type),
            remark: Set(optional_text(input.remark)),
            status: Set(RecordStatus::Completed),
            ..Default::default()
        };

        let (record, change) = self
            .db
            .transaction::<_, (outbound_record::Model, StockChange), ServiceError>(move |txn| {
                Box::pin(async move {
                    require_product(txn, product_id).await?;
                    let record = model.insert(txn).await?;
                    let change = StockReconciler::apply(txn, product_id, -quantity).await?;
                    Ok((record, change))
                })
            })
            .await?;

        let mut events = vec![Event::OutboundRecorded {
            record_id,
            product_id,
            quantity,
            outbound_type,
        }];
        events.extend(change.events());
        self.event_sender.send_all(events).await;

        info!(%record_id, %product_id, quantity, %outbound_type, "Recorded outbound");
        self.outbound_view(record).await
    }

    #[instrument(skip(self))]
    pub async fn get_outbound(&self, record_id: Uuid) -> Result<OutboundView, ServiceError> {
        let record = OutboundRecord::find_by_id(record_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Outbound record", record_id))?;
        self.outbound_view(record).await
    }

    /// List outbound records, latest movement first
    #[instrument(skip(self))]
    pub async fn list_outbound(
        &self,
        filter: OutboundFilter,
        page: PageRequest,
    ) -> Result<Page<OutboundView>, ServiceError> {
        let (from, to) = date_range(filter.start_date.as_deref(), filter.end_date.as_deref())?;

        let mut query = OutboundRecord::find();
        if let Some(product_id) = filter.product_id {
            query = query.filter(outbound_record::Column::ProductId.eq(product_id));
        }
        if let Some(outbound_type) = filter.outbound_type {
            query = query.filter(outbound_record::Column::OutboundType.eq(outbound_type));
        }
        if let Some(status) = filter.status {
            query = query.filter(outbound_record::Column::Status.eq(status));
        }
        if let Some(from) = from {
            query = query.filter(outbound_record::Column::OutboundDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(outbound_record::Column::OutboundDate.lt(to));
        }

        let total = query.clone().count(&*self.db).await?;
        let records = query
            .order_by_desc(outbound_record::Column::OutboundDate)
            .order_by_desc(outbound_record::Column::CreatedAt)
            .limit(page.page_size)
            .offset(page.offset())
            .all(&*self.db)
            .await?;

        Ok(Page {
            items: self.populate_outbound(records).await?,
            total,
            request: page,
        })
    }

    /// Edit an outbound record; a larger quantity must still be covered by stock
    #[instrument(skip(self))]
    pub async fn update_outbound(
        &self,
        record_id: Uuid,
        input: UpdateOutboundInput,
    ) -> Result<OutboundView, ServiceError> {
        if let Some(quantity) = input.quantity {
            ensure_quantity(quantity)?;
        }
        if let Some(price) = input.unit_price {
            ensure_price("unitPrice", price)?;
        }
        let outbound_date = input
            .outbound_date
            .as_deref()
            .map(parse_movement_date)
            .transpose()?;

        let (record, changes) = self
            .db
            .transaction::<_, (outbound_record::Model, Vec<StockChange>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let existing = OutboundRecord::find_by_id(record_id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::not_found("Outbound record", record_id)
                            })?;
                        if existing.status.is_voided() {
                            return Err(ServiceError::ValidationError(format!(
                                "Outbound record {} is voided and cannot be updated",
                                record_id
                            )));
                        }

                        let new_product = input.product_id.unwrap_or(existing.product_id);
                        if new_product != existing.product_id {
                            require_product(txn, new_product).await?;
                        }
                        let new_quantity = input.quantity.unwrap_or(existing.quantity);
                        let new_price = input.unit_price.unwrap_or(existing.unit_price);

                        let mut changes = Vec::new();
                        if new_product != existing.product_id {
                            changes.push(
                                StockReconciler::apply(
                                    txn,
                                    existing.product_id,
                                    existing.quantity,
                                )
                                .await?,
                            );
                            changes.push(
                                StockReconciler::apply(txn, new_product, -new_quantity).await?,
                            );
                        } else if new_quantity != existing.quantity {
                            changes.push(
                                StockReconciler::apply(
                                    txn,
                                    new_product,
                                    existing.quantity - new_quantity,
                                )
                                .await?,
                            );
                        }

                        let mut active: outbound_record::ActiveModel = existing.into();
                        active.product_id = Set(new_product);
                        active.quantity = Set(new_quantity);
                        active.unit_price = Set(new_price);
                        active.total_amount = Set(total_amount(new_quantity, new_price));
                        if let Some(date) = outbound_date {
                            active.outbound_date = Set(date);
                        }
                        if let Some(outbound_type) = input.outbound_type {
                            active.outbound_type = Set(outbound_type);
                        }
                        if input.remark.is_some() {
                            active.remark = Set(optional_text(input.remark));
                        }
                        let record = active.update(txn).await?;
                        Ok((record, changes))
                    })
                },
            )
            .await?;

        self.event_sender
            .send_all(changes.iter().flat_map(StockChange::events))
            .await;

        info!(%record_id, "Updated outbound record");
        self.outbound_view(record).await
    }

    /// Remove an outbound record and put its quantity back on the shelf
    #[instrument(skip(self))]
    pub async fn delete_outbound(&self, record_id: Uuid) -> Result<(), ServiceError> {
        let (record, change) = self
            .db
            .transaction::<_, (outbound_record::Model, Option<StockChange>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let existing = find_outbound(txn, record_id).await?;
                        let change = reverse_outbound(txn, &existing).await?;
                        OutboundRecord::delete_by_id(record_id).exec(txn).await?;
                        Ok((existing, change))
                    })
                },
            )
            .await?;

        self.emit_reversal(
            MovementKind::Outbound,
            record.id,
            record.product_id,
            ReversalKind::Deleted,
            change,
        )
        .await;

        info!(%record_id, "Deleted outbound record");
        Ok(())
    }

    /// Keep an outbound record for the audit trail but cancel its stock effect
    #[instrument(skip(self))]
    pub async fn void_outbound(&self, record_id: Uuid) -> Result<OutboundView, ServiceError> {
        let (record, change) = self
            .db
            .transaction::<_, (outbound_record::Model, Option<StockChange>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let existing = find_outbound(txn, record_id).await?;
                        if existing.status.is_voided() {
                            return Err(ServiceError::ValidationError(format!(
                                "Outbound record {} is already voided",
                                record_id
                            )));
                        }
                        let change = reverse_outbound(txn, &existing).await?;
                        let mut active: outbound_record::ActiveModel = existing.into();
                        active.status = Set(RecordStatus::Voided);
                        let record = active.update(txn).await?;
                        Ok((record, change))
                    })
                },
            )
            .await?;

        self.emit_reversal(
            MovementKind::Outbound,
            record.id,
            record.product_id,
            ReversalKind::Voided,
            change,
        )
        .await;

        info!(%record_id, "Voided outbound record");
        self.outbound_view(record).await
    }

    async fn emit_reversal(
        &self,
        kind: MovementKind,
        record_id: Uuid,
        product_id: Uuid,
        reversal: ReversalKind,
        change: Option<StockChange>,
    ) {
        let mut events = vec![Event::MovementReversed {
            kind,
            record_id,
            product_id,
            reversal,
        }];
        if let Some(change) = change {
            events.extend(change.events());
        }
        self.event_sender.send_all(events).await;
    }

    async fn inbound_view(&self, record: inbound_record::Model) -> Result<InboundView, ServiceError> {
        let mut views = self.populate_inbound(vec![record]).await?;
        views
            .pop()
            .ok_or_else(|| ServiceError::InternalError("inbound record vanished".to_string()))
    }

    async fn outbound_view(
        &self,
        record: outbound_record::Model,
    ) -> Result<OutboundView, ServiceError> {
        let mut views = self.populate_outbound(vec![record]).await?;
        views
            .pop()
            .ok_or_else(|| ServiceError::InternalError("outbound record vanished".to_string()))
    }

    async fn populate_inbound(
        &self,
        records: Vec<inbound_record::Model>,
    ) -> Result<Vec<InboundView>, ServiceError> {
        let products = self
            .products_by_id(records.iter().map(|r| r.product_id))
            .await?;
        let suppliers = self
            .suppliers_by_id(records.iter().map(|r| r.supplier_id))
            .await?;

        Ok(records
            .into_iter()
            .map(|record| InboundView {
                product: products.get(&record.product_id).cloned(),
                supplier: suppliers.get(&record.supplier_id).cloned(),
                record,
            })
            .collect())
    }

    async fn populate_outbound(
        &self,
        records: Vec<outbound_record::Model>,
    ) -> Result<Vec<OutboundView>, ServiceError> {
        let products = self
            .products_by_id(records.iter().map(|r| r.product_id))
            .await?;

        Ok(records
            .into_iter()
            .map(|record| OutboundView {
                product: products.get(&record.product_id).cloned(),
                record,
            })
            .collect())
    }

    async fn products_by_id(
        &self,
        ids: impl Iterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, ProductRef>, ServiceError> {
        let ids: Vec<Uuid> = ids.collect::<HashSet<_>>().into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let products = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(&*self.db)
            .await?;
        Ok(products.iter().map(|p| (p.id, ProductRef::from(p))).collect())
    }

    async fn suppliers_by_id(
        &self,
        ids: impl Iterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, SupplierRef>, ServiceError> {
        let ids: Vec<Uuid> = ids.collect::<HashSet<_>>().into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let suppliers = supplier::Entity::find()
            .filter(supplier::Column::Id.is_in(ids))
            .all(&*self.db)
            .await?;
        Ok(suppliers
            .into_iter()
            .map(|s| {
                (
                    s.id,
                    SupplierRef {
                        id: s.id,
                        name: s.name,
                    },
                )
            })
            .collect())
    }
}

fn ensure_quantity(quantity: i32) -> Result<(), ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::ValidationError(
            "quantity must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn movement_date(raw: Option<&str>) -> Result<DateTime<Utc>, ServiceError> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_movement_date(raw),
        _ => Ok(Utc::now()),
    }
}

fn date_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), ServiceError> {
    let start = parse_filter_day("startDate", start)?;
    let end = parse_filter_day("endDate", end)?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ServiceError::ValidationError(
                "startDate must not be after endDate".to_string(),
            ));
        }
    }
    Ok(day_bounds(start, end))
}

/// A referenced product must exist; a dangling reference is a bad request, not a 404.
async fn require_product<C>(conn: &C, product_id: Uuid) -> Result<product::Model, ServiceError>
where
    C: ConnectionTrait,
{
    product::Entity::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::ValidationError(format!("Product {} does not exist", product_id)))
}

async fn require_supplier<C>(conn: &C, supplier_id: Uuid) -> Result<supplier::Model, ServiceError>
where
    C: ConnectionTrait,
{
    supplier::Entity::find_by_id(supplier_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::ValidationError(format!("Supplier {} does not exist", supplier_id))
        })
}

async fn find_inbound(
    txn: &DatabaseTransaction,
    record_id: Uuid,
) -> Result<inbound_record::Model, ServiceError> {
    InboundRecord::find_by_id(record_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Inbound record", record_id))
}

async fn find_outbound(
    txn: &DatabaseTransaction,
    record_id: Uuid,
) -> Result<outbound_record::Model, ServiceError> {
    OutboundRecord::find_by_id(record_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Outbound record", record_id))
}

/// Voided records have no stock effect left to reverse.
async fn reverse_inbound(
    txn: &DatabaseTransaction,
    record: &inbound_record::Model,
) -> Result<Option<StockChange>, ServiceError> {
    if record.status.is_voided() {
        return Ok(None);
    }
    StockReconciler::apply_floored(txn, record.product_id, -record.quantity)
        .await
        .map(Some)
}

async fn reverse_outbound(
    txn: &DatabaseTransaction,
    record: &outbound_record::Model,
) -> Result<Option<StockChange>, ServiceError> {
    if record.status.is_voided() {
        return Ok(None);
    }
    StockReconciler::apply(txn, record.product_id, record.quantity)
        .await
        .map(Some)
}
