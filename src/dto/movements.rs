use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::validate_price;
use crate::entities::{outbound_record::OutboundType, RecordStatus};
use crate::services::movements::{
    CreateInboundInput, CreateOutboundInput, InboundFilter, InboundView, OutboundFilter,
    OutboundView, ProductRef, SupplierRef, UpdateInboundInput, UpdateOutboundInput,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "product": "550e8400-e29b-41d4-a716-446655440000",
    "supplier": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
    "quantity": 50,
    "unitPrice": "2.10",
    "inboundDate": "2024-06-01"
}))]
pub struct CreateInboundRequest {
    #[serde(alias = "productId")]
    pub product: Uuid,
    #[serde(alias = "supplierId")]
    pub supplier: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(custom = "validate_price")]
    pub unit_price: Decimal,
    /// RFC 3339 timestamp or `YYYY-MM-DD`; defaults to now
    pub inbound_date: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<CreateInboundRequest> for CreateInboundInput {
    fn from(req: CreateInboundRequest) -> Self {
        Self {
            product_id: req.product,
            supplier_id: req.supplier,
            quantity: req.quantity,
            unit_price: req.unit_price,
            inbound_date: req.inbound_date,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInboundRequest {
    #[serde(alias = "productId")]
    pub product: Option<Uuid>,
    #[serde(alias = "supplierId")]
    pub supplier: Option<Uuid>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    #[validate(custom = "validate_price")]
    pub unit_price: Option<Decimal>,
    pub inbound_date: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<UpdateInboundRequest> for UpdateInboundInput {
    fn from(req: UpdateInboundRequest) -> Self {
        Self {
            product_id: req.product,
            supplier_id: req.supplier,
            quantity: req.quantity,
            unit_price: req.unit_price,
            inbound_date: req.inbound_date,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "product": "550e8400-e29b-41d4-a716-446655440000",
    "quantity": 3,
    "unitPrice": "3.50",
    "outboundDate": "2024-06-02T09:15:00+08:00",
    "outboundType": "sale"
}))]
pub struct CreateOutboundRequest {
    #[serde(alias = "productId")]
    pub product: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(custom = "validate_price")]
    pub unit_price: Decimal,
    /// RFC 3339 timestamp or `YYYY-MM-DD`; defaults to now
    pub outbound_date: Option<String>,
    /// Defaults to `sale`
    pub outbound_type: Option<OutboundType>,
    #[validate(length(max = 2000))]
    pub remark: Option<String>,
}

impl From<CreateOutboundRequest> for CreateOutboundInput {
    fn from(req: CreateOutboundRequest) -> Self {
        Self {
            product_id: req.product,
            quantity: req.quantity,
            unit_price: req.unit_price,
            outbound_date: req.outbound_date,
            outbound_type: req.outbound_type,
            remark: req.remark,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutboundRequest {
    #[serde(alias = "productId")]
    pub product: Option<Uuid>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    #[validate(custom = "validate_price")]
    pub unit_price: Option<Decimal>,
    pub outbound_date: Option<String>,
    pub outbound_type: Option<OutboundType>,
    #[validate(length(max = 2000))]
    pub remark: Option<String>,
}

impl From<UpdateOutboundRequest> for UpdateOutboundInput {
    fn from(req: UpdateOutboundRequest) -> Self {
        Self {
            product_id: req.product,
            quantity: req.quantity,
            unit_price: req.unit_price,
            outbound_date: req.outbound_date,
            outbound_type: req.outbound_type,
            remark: req.remark,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InboundListQuery {
    pub product: Option<Uuid>,
    pub supplier: Option<Uuid>,
    pub status: Option<RecordStatus>,
    /// First day, inclusive (`YYYY-MM-DD`)
    pub start_date: Option<String>,
    /// Last day, inclusive (`YYYY-MM-DD`)
    pub end_date: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl InboundListQuery {
    pub fn filter(&self) -> InboundFilter {
        InboundFilter {
            product_id: self.product,
            supplier_id: self.supplier,
            status: self.status,
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OutboundListQuery {
    pub product: Option<Uuid>,
    pub outbound_type: Option<OutboundType>,
    pub status: Option<RecordStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl OutboundListQuery {
    pub fn filter(&self) -> OutboundFilter {
        OutboundFilter {
            product_id: self.product,
            outbound_type: self.outbound_type,
            status: self.status,
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}

/// Product display fields on a movement
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub unit: String,
}

impl From<ProductRef> for ProductSummary {
    fn from(p: ProductRef) -> Self {
        Self {
            id: p.id,
            name: p.name,
            brand: p.brand,
            unit: p.unit,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<SupplierRef> for SupplierSummary {
    fn from(s: SupplierRef) -> Self {
        Self {
            id: s.id,
            name: s.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InboundResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product: Option<ProductSummary>,
    pub supplier_id: Uuid,
    pub supplier: Option<SupplierSummary>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub inbound_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InboundView> for InboundResponse {
    fn from(view: InboundView) -> Self {
        let record = view.record;
        Self {
            id: record.id,
            product_id: record.product_id,
            product: view.product.map(Into::into),
            supplier_id: record.supplier_id,
            supplier: view.supplier.map(Into::into),
            quantity: record.quantity,
            unit_price: record.unit_price,
            total_amount: record.total_amount,
            inbound_date: record.inbound_date,
            notes: record.notes,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutboundResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product: Option<ProductSummary>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub outbound_date: DateTime<Utc>,
    pub outbound_type: OutboundType,
    pub remark: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OutboundView> for OutboundResponse {
    fn from(view: OutboundView) -> Self {
        let record = view.record;
        Self {
            id: record.id,
            product_id: record.product_id,
            product: view.product.map(Into::into),
            quantity: record.quantity,
            unit_price: record.unit_price,
            total_amount: record.total_amount,
            outbound_date: record.outbound_date,
            outbound_type: record.outbound_type,
            remark: record.remark,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inbound_request_accepts_id_aliases() {
        let product = Uuid::new_v4();
        let supplier = Uuid::new_v4();
        let req: CreateInboundRequest = serde_json::from_value(json!({
            "productId": product,
            "supplierId": supplier,
            "quantity": 5,
            "unitPrice": 2
        }))
        .unwrap();
        assert_eq!(req.product, product);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn zero_quantity_fails_validation() {
        let req: CreateOutboundRequest = serde_json::from_value(json!({
            "product": Uuid::new_v4(),
            "quantity": 0,
            "unitPrice": "3.50",
            "outboundType": "damage"
        }))
        .unwrap();
        assert_eq!(req.outbound_type, Some(OutboundType::Damage));
        assert!(req.validate().is_err());
    }
}
