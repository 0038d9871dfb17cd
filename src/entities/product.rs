use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Default unit of measure for new products
pub const DEFAULT_UNIT: &str = "个";

/// Whether a product can still be sold and restocked
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// Product entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    pub brand: String,
    pub category: String,

    /// Unit of measure shown next to quantities
    pub unit: String,

    pub barcode: Option<String>,

    pub purchase_price: Decimal,
    pub retail_price: Decimal,
    pub input_price: Decimal,

    /// On-hand quantity. Only `services::stock::StockReconciler` writes this column.
    pub current_stock: i32,

    /// Low-stock threshold
    pub stock_alert: Option<i32>,

    pub status: ProductStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// True when a threshold is set and stock has fallen to it or below.
    pub fn is_low_stock(&self) -> bool {
        self.stock_alert
            .map(|alert| self.current_stock <= alert)
            .unwrap_or(false)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inbound_record::Entity")]
    InboundRecords,
    #[sea_orm(has_many = "super::outbound_record::Entity")]
    OutboundRecords,
}

impl Related<super::inbound_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InboundRecords.def()
    }
}

impl Related<super::outbound_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OutboundRecords.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.unit {
                active_model.unit = Set(DEFAULT_UNIT.to_string());
            }
            if let ActiveValue::NotSet = active_model.status {
                active_model.status = Set(ProductStatus::Active);
            }
            if let ActiveValue::NotSet = active_model.current_stock {
                active_model.current_stock = Set(0);
            }
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }

        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i32, alert: Option<i32>) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "可乐".into(),
            brand: "可口可乐".into(),
            category: "饮料".into(),
            unit: DEFAULT_UNIT.into(),
            barcode: None,
            purchase_price: Decimal::new(250, 2),
            retail_price: Decimal::new(350, 2),
            input_price: Decimal::ZERO,
            current_stock: stock,
            stock_alert: alert,
            status: ProductStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn low_stock_needs_a_threshold() {
        assert!(!product(0, None).is_low_stock());
        assert!(product(5, Some(5)).is_low_stock());
        assert!(!product(6, Some(5)).is_low_stock());
    }

    #[test]
    fn status_renders_lowercase() {
        assert_eq!(ProductStatus::Inactive.to_string(), "inactive");
        assert_eq!(
            serde_json::to_value(ProductStatus::Active).unwrap(),
            serde_json::json!("active")
        );
    }
}
