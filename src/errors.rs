use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{error::DbErr, SqlErr, TransactionError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "success": false,
    "error": "Bad Request",
    "message": "库存不足，当前库存：20，需要出库：25",
    "details": { "productId": "550e8400-e29b-41d4-a716-446655440000", "currentStock": 20, "requested": 25 },
    "requestId": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Structured details (stock figures, or the underlying error outside production)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
    /// Request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("库存不足，当前库存：{current}，需要出库：{requested}")]
    InsufficientStock {
        product_id: Uuid,
        current: i32,
        requested: i32,
    },

    /// Editing an inbound record would take more stock back than the product holds.
    #[error("库存不足，当前库存：{current}，入库调整需要扣减：{requested}")]
    InsufficientStockForAdjustment {
        product_id: Uuid,
        current: i32,
        requested: i32,
    },

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(db) => ServiceError::DatabaseError(db),
            TransactionError::Transaction(inner) => inner,
        }
    }
}

impl ServiceError {
    /// Re-labels a stock shortfall raised while editing an inbound record, so the
    /// message does not speak of an outbound.
    pub fn into_inbound_adjustment(self) -> Self {
        match self {
            Self::InsufficientStock {
                product_id,
                current,
                requested,
            } => Self::InsufficientStockForAdjustment {
                product_id,
                current,
                requested,
            },
            other => other,
        }
    }

    /// A unique-constraint violation becomes `Duplicate`; any other database error is kept.
    pub fn from_unique_violation(err: DbErr, message: impl FnOnce() -> String) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Duplicate(message()),
            _ => Self::DatabaseError(err),
        }
    }

    /// Convenience constructor for a missing entity.
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_)
            | Self::InsufficientStock { .. }
            | Self::InsufficientStockForAdjustment { .. }
            | Self::Duplicate(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) | Self::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Structured details for the error body. Server-side failures only expose
    /// their cause when the current request allows it.
    pub fn response_details(&self) -> Option<Value> {
        match self {
            Self::InsufficientStock {
                product_id,
                current,
                requested,
            }
            | Self::InsufficientStockForAdjustment {
                product_id,
                current,
                requested,
            } => Some(json!({
                "productId": product_id,
                "currentStock": current,
                "requested": requested,
            })),
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_)
                if crate::tracing::error_details_exposed() =>
            {
                Some(Value::String(self.to_string()))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let err = ErrorResponse {
            success: false,
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: self.response_details(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::NotFound("missing".into()).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(!payload.success);
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
    }

    #[tokio::test]
    async fn insufficient_stock_keeps_literal_message_and_figures() {
        let err = ServiceError::InsufficientStock {
            product_id: Uuid::nil(),
            current: 20,
            requested: 25,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.message, "库存不足，当前库存：20，需要出库：25");
        let details = payload.details.expect("stock details");
        assert_eq!(details["currentStock"], 20);
        assert_eq!(details["requested"], 25);
    }

    #[test]
    fn inbound_adjustment_shortfall_has_its_own_message() {
        let err = ServiceError::InsufficientStock {
            product_id: Uuid::nil(),
            current: 3,
            requested: 7,
        }
        .into_inbound_adjustment();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "库存不足，当前库存：3，入库调整需要扣减：7");
        let details = err.response_details().expect("stock details");
        assert_eq!(details["currentStock"], 3);

        let untouched = ServiceError::NotFound("x".into()).into_inbound_adjustment();
        assert!(matches!(untouched, ServiceError::NotFound(_)));
    }

    #[test]
    fn non_unique_database_errors_stay_database_errors() {
        let err = ServiceError::from_unique_violation(DbErr::Custom("boom".into()), || {
            "never used".to_string()
        });
        assert!(matches!(err, ServiceError::DatabaseError(_)));
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Duplicate("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_hidden_by_default() {
        let err = ServiceError::InternalError("pool exhausted".into());
        assert_eq!(err.response_message(), "Internal server error");
        assert!(err.response_details().is_none());
    }

    #[tokio::test]
    async fn internal_details_exposed_when_scope_allows() {
        let details = crate::tracing::scope_error_details(true, async {
            ServiceError::InternalError("pool exhausted".into()).response_details()
        })
        .await;
        assert_eq!(
            details,
            Some(Value::String("Internal error: pool exhausted".into()))
        );
    }

    #[test]
    fn transaction_error_unwraps_inner_service_error() {
        let err: ServiceError =
            TransactionError::Transaction(ServiceError::Duplicate("x".into())).into();
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }
}
