use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::supplier::{self, PaymentMethod, SupplierStatus};
use crate::services::suppliers::{CreateSupplierInput, SupplierFilter, UpdateSupplierInput};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub contact: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<SupplierStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<CreateSupplierRequest> for CreateSupplierInput {
    fn from(req: CreateSupplierRequest) -> Self {
        Self {
            name: req.name,
            contact: req.contact,
            phone: req.phone,
            address: req.address,
            payment_method: req.payment_method,
            status: req.status,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub contact: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<SupplierStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<UpdateSupplierRequest> for UpdateSupplierInput {
    fn from(req: UpdateSupplierRequest) -> Self {
        Self {
            name: req.name,
            contact: req.contact,
            phone: req.phone,
            address: req.address,
            payment_method: req.payment_method,
            status: req.status,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SupplierListQuery {
    /// Substring of name, contact or phone
    pub search: Option<String>,
    pub status: Option<SupplierStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl SupplierListQuery {
    pub fn filter(&self) -> SupplierFilter {
        SupplierFilter {
            search: self.search.clone(),
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: SupplierStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<supplier::Model> for SupplierResponse {
    fn from(model: supplier::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact: model.contact,
            phone: model.phone,
            address: model.address,
            payment_method: model.payment_method,
            status: model.status,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
