#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use storeledger_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Helper harness for spinning up the full router backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // One connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.cors_allow_any_origin = true;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = storeledger_api::build_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a request and decode the JSON body.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is JSON")
        };
        (status, value)
    }

    pub async fn create_product(&self, name: &str, brand: &str, stock_alert: Option<i32>) -> String {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/v1/products",
                Some(json!({
                    "name": name,
                    "brand": brand,
                    "category": "饮料",
                    "unit": "瓶",
                    "purchasePrice": "2.50",
                    "retailPrice": "3.50",
                    "stockAlert": stock_alert,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create product: {body}");
        body["data"]["id"].as_str().expect("product id").to_string()
    }

    pub async fn create_supplier(&self, name: &str) -> String {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/v1/suppliers",
                Some(json!({ "name": name, "phone": "13800000000" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create supplier: {body}");
        body["data"]["id"].as_str().expect("supplier id").to_string()
    }

    pub async fn inbound(&self, product: &str, supplier: &str, quantity: i32) -> (StatusCode, Value) {
        self.json(
            Method::POST,
            "/api/v1/inbound",
            Some(json!({
                "product": product,
                "supplier": supplier,
                "quantity": quantity,
                "unitPrice": "2.50",
            })),
        )
        .await
    }

    pub async fn outbound(&self, product: &str, quantity: i32) -> (StatusCode, Value) {
        self.json(
            Method::POST,
            "/api/v1/outbound",
            Some(json!({
                "product": product,
                "quantity": quantity,
                "unitPrice": "3.50",
                "outboundType": "sale",
            })),
        )
        .await
    }

    pub async fn stock_of(&self, product: &str) -> i64 {
        let (status, body) = self
            .json(Method::GET, &format!("/api/v1/products/{product}"), None)
            .await;
        assert_eq!(status, StatusCode::OK, "get product: {body}");
        body["data"]["currentStock"].as_i64().expect("currentStock")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Decimals serialize as strings; accept numbers too.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("expected a decimal, got {other}"),
    }
}
