use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::validate_price;
use crate::entities::product::{self, ProductStatus};
use crate::services::products::{CreateProductInput, ProductFilter, UpdateProductInput};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "可口可乐 330ml",
    "brand": "可口可乐",
    "category": "饮料",
    "unit": "瓶",
    "purchasePrice": "2.10",
    "retailPrice": "3.50",
    "stockAlert": 12
}))]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub brand: String,
    #[validate(length(min = 1, max = 255))]
    pub category: String,
    #[validate(length(max = 16))]
    pub unit: Option<String>,
    #[validate(length(max = 64))]
    pub barcode: Option<String>,
    #[validate(custom = "validate_price")]
    pub purchase_price: Decimal,
    #[validate(custom = "validate_price")]
    pub retail_price: Decimal,
    #[validate(custom = "validate_price")]
    pub input_price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock_alert: Option<i32>,
    pub status: Option<ProductStatus>,
}

impl From<CreateProductRequest> for CreateProductInput {
    fn from(req: CreateProductRequest) -> Self {
        Self {
            name: req.name,
            brand: req.brand,
            category: req.category,
            unit: req.unit,
            barcode: req.barcode,
            purchase_price: req.purchase_price,
            retail_price: req.retail_price,
            input_price: req.input_price,
            stock_alert: req.stock_alert,
            status: req.status,
        }
    }
}

/// Partial update. Stock cannot be set here; it only moves through inbound and
/// outbound records.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub category: Option<String>,
    #[validate(length(max = 16))]
    pub unit: Option<String>,
    #[validate(length(max = 64))]
    pub barcode: Option<String>,
    #[validate(custom = "validate_price")]
    pub purchase_price: Option<Decimal>,
    #[validate(custom = "validate_price")]
    pub retail_price: Option<Decimal>,
    #[validate(custom = "validate_price")]
    pub input_price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock_alert: Option<i32>,
    pub status: Option<ProductStatus>,
}

impl From<UpdateProductRequest> for UpdateProductInput {
    fn from(req: UpdateProductRequest) -> Self {
        Self {
            name: req.name,
            brand: req.brand,
            category: req.category,
            unit: req.unit,
            barcode: req.barcode,
            purchase_price: req.purchase_price,
            retail_price: req.retail_price,
            input_price: req.input_price,
            stock_alert: req.stock_alert,
            status: req.status,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Substring of name, brand or barcode
    pub search: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub status: Option<ProductStatus>,
    /// Only products at or below their stock alert
    pub low_stock: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ProductListQuery {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            search: self.search.clone(),
            category: self.category.clone(),
            brand: self.brand.clone(),
            status: self.status,
            low_stock: self.low_stock.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub unit: String,
    pub barcode: Option<String>,
    pub purchase_price: Decimal,
    pub retail_price: Decimal,
    pub input_price: Decimal,
    pub current_stock: i32,
    pub stock_alert: Option<i32>,
    pub is_low_stock: bool,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        let is_low_stock = model.is_low_stock();
        Self {
            id: model.id,
            name: model.name,
            brand: model.brand,
            category: model.category,
            unit: model.unit,
            barcode: model.barcode,
            purchase_price: model.purchase_price,
            retail_price: model.retail_price,
            input_price: model.input_price,
            current_stock: model.current_stock,
            stock_alert: model.stock_alert,
            is_low_stock,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
