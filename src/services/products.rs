use crate::{
    entities::{
        inbound_record, outbound_record,
        product::{self, Entity as Product, ProductStatus, DEFAULT_UNIT},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{ensure_price, optional_text, required_text, Page, PageRequest},
};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for creating a product
#[derive(Debug, Clone, Default)]
pub struct CreateProductInput {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub unit: Option<String>,
    pub barcode: Option<String>,
    pub purchase_price: Decimal,
    pub retail_price: Decimal,
    pub input_price: Option<Decimal>,
    pub stock_alert: Option<i32>,
    pub status: Option<ProductStatus>,
}

/// Input for updating a product. There is deliberately no stock field.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub barcode: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
    pub input_price: Option<Decimal>,
    pub stock_alert: Option<i32>,
    pub status: Option<ProductStatus>,
}

/// Filters for listing products
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Substring of name, brand or barcode
    pub search: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub status: Option<ProductStatus>,
    /// Only products at or below their `stock_alert`
    pub low_stock: bool,
}

/// Product master data. Never touches `current_stock` after creation.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Create a new product with zero stock
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let name = required_text("name", &input.name)?;
        let brand = required_text("brand", &input.brand)?;
        let category = required_text("category", &input.category)?;
        let input_price = input.input_price.unwrap_or(Decimal::ZERO);
        ensure_price("purchasePrice", input.purchase_price)?;
        ensure_price("retailPrice", input.retail_price)?;
        ensure_price("inputPrice", input_price)?;
        ensure_stock_alert(input.stock_alert)?;

        self.ensure_unique_name_brand(&name, &brand, None, false)
            .await?;

        let duplicate = format!("Product {} ({}) already exists", name, brand);
        let product_id = Uuid::new_v4();
        let product = product::ActiveModel {
            id: Set(product_id),
            name: Set(name),
            brand: Set(brand),
            category: Set(category),
            unit: Set(optional_text(input.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string())),
            barcode: Set(optional_text(input.barcode)),
            purchase_price: Set(input.purchase_price),
            retail_price: Set(input.retail_price),
            input_price: Set(input_price),
            current_stock: Set(0),
            stock_alert: Set(input.stock_alert),
            status: Set(input.status.unwrap_or_default()),
            ..Default::default()
        };

        let product = product
            .insert(&*self.db)
            .await
            .map_err(|e| ServiceError::from_unique_violation(e, || duplicate))?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product_id))
            .await;

        info!("Created product: {}", product_id);
        Ok(product)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))
    }

    /// List products, newest first
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<product::Model>, ServiceError> {
        let mut query = Product::find();

        if let Some(search) = optional_text(filter.search) {
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.contains(&search))
                    .add(product::Column::Brand.contains(&search))
                    .add(product::Column::Barcode.contains(&search)),
            );
        }
        if let Some(category) = optional_text(filter.category) {
            query = query.filter(product::Column::Category.eq(category));
        }
        if let Some(brand) = optional_text(filter.brand) {
            query = query.filter(product::Column::Brand.eq(brand));
        }
        if let Some(status) = filter.status {
            query = query.filter(product::Column::Status.eq(status));
        }
        if filter.low_stock {
            query = query
                .filter(product::Column::StockAlert.is_not_null())
                .filter(
                    Expr::col(product::Column::CurrentStock)
                        .lte(Expr::col(product::Column::StockAlert)),
                );
        }

        let total = query.clone().count(&*self.db).await?;
        let items = query
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .limit(page.page_size)
            .offset(page.offset())
            .all(&*self.db)
            .await?;

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    /// Update product master data
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.get_product(product_id).await?;

        let name = input
            .name
            .as_deref()
            .map(|v| required_text("name", v))
            .transpose()?;
        let brand = input
            .brand
            .as_deref()
            .map(|v| required_text("brand", v))
            .transpose()?;
        let category = input
            .category
            .as_deref()
            .map(|v| required_text("category", v))
            .transpose()?;
        for (field, value) in [
            ("purchasePrice", input.purchase_price),
            ("retailPrice", input.retail_price),
            ("inputPrice", input.input_price),
        ] {
            if let Some(value) = value {
                ensure_price(field, value)?;
            }
        }
        ensure_stock_alert(input.stock_alert)?;

        let name_changed = name.as_ref().is_some_and(|n| *n != existing.name);
        let brand_changed = brand.as_ref().is_some_and(|b| *b != existing.brand);
        if name_changed || brand_changed {
            let check_name = name.clone().unwrap_or_else(|| existing.name.clone());
            let check_brand = brand.clone().unwrap_or_else(|| existing.brand.clone());
            self.ensure_unique_name_brand(&check_name, &check_brand, Some(product_id), true)
                .await?;
        }

        let duplicate = format!(
            "Product {} ({}) already exists",
            name.as_deref().unwrap_or(&existing.name),
            brand.as_deref().unwrap_or(&existing.brand)
        );
        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(brand) = brand {
            active.brand = Set(brand);
        }
        if let Some(category) = category {
            active.category = Set(category);
        }
        if let Some(unit) = optional_text(input.unit) {
            active.unit = Set(unit);
        }
        if input.barcode.is_some() {
            active.barcode = Set(optional_text(input.barcode));
        }
        if let Some(price) = input.purchase_price {
            active.purchase_price = Set(price);
        }
        if let Some(price) = input.retail_price {
            active.retail_price = Set(price);
        }
        if let Some(price) = input.input_price {
            active.input_price = Set(price);
        }
        if let Some(alert) = input.stock_alert {
            active.stock_alert = Set(Some(alert));
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }

        let product = active
            .update(&*self.db)
            .await
            .map_err(|e| ServiceError::from_unique_violation(e, || duplicate))?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product_id))
            .await;

        info!("Updated product: {}", product_id);
        Ok(product)
    }

    /// Delete a product that has never been moved
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let product = self.get_product(product_id).await?;

        let inbound = inbound_record::Entity::find()
            .filter(inbound_record::Column::ProductId.eq(product_id))
            .count(&*self.db)
            .await?;
        let outbound = outbound_record::Entity::find()
            .filter(outbound_record::Column::ProductId.eq(product_id))
            .count(&*self.db)
            .await?;
        if inbound + outbound > 0 {
            return Err(ServiceError::Conflict(format!(
                "Product {} has {} stock movements; deactivate it instead",
                product_id,
                inbound + outbound
            )));
        }

        let active: product::ActiveModel = product.into();
        active.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductDeleted(product_id))
            .await;

        info!("Deleted product {}", product_id);
        Ok(())
    }

    /// Distinct categories, alphabetical
    pub async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        self.distinct_values(product::Column::Category).await
    }

    /// Distinct brands, alphabetical
    pub async fn brands(&self) -> Result<Vec<String>, ServiceError> {
        self.distinct_values(product::Column::Brand).await
    }

    async fn distinct_values(&self, column: product::Column) -> Result<Vec<String>, ServiceError> {
        Product::find()
            .select_only()
            .column(column)
            .distinct()
            .order_by_asc(column)
            .into_tuple::<String>()
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    async fn ensure_unique_name_brand(
        &self,
        name: &str,
        brand: &str,
        exclude_id: Option<Uuid>,
        active_only: bool,
    ) -> Result<(), ServiceError> {
        let mut query = Product::find()
            .filter(product::Column::Name.eq(name))
            .filter(product::Column::Brand.eq(brand));
        if let Some(id) = exclude_id {
            query = query.filter(product::Column::Id.ne(id));
        }
        if active_only {
            query = query.filter(product::Column::Status.eq(ProductStatus::Active));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Duplicate(format!(
                "Product {} ({}) already exists",
                name, brand
            )));
        }

        Ok(())
    }
}

fn ensure_stock_alert(alert: Option<i32>) -> Result<(), ServiceError> {
    match alert {
        Some(value) if value < 0 => Err(ServiceError::ValidationError(
            "stockAlert must be greater than or equal to 0".to_string(),
        )),
        _ => Ok(()),
    }
}
