mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn supplier_lifecycle() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/suppliers",
            Some(json!({
                "name": "城西批发",
                "contact": "王经理",
                "phone": "13912345678",
                "paymentMethod": "transfer",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["paymentMethod"], "transfer");
    assert_eq!(body["data"]["status"], "active");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/v1/suppliers/{id}"),
            Some(json!({ "address": "城西路 12 号", "status": "inactive" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["address"], "城西路 12 号");
    assert_eq!(body["data"]["contact"], "王经理");

    let (_, body) = app
        .json(Method::GET, "/api/v1/suppliers?status=inactive", None)
        .await;
    assert_eq!(body["pagination"]["total"], 1);

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/v1/suppliers/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .json(Method::GET, &format!("/api/v1/suppliers/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn supplier_names_are_unique() {
    let app = TestApp::new().await;
    app.create_supplier("城东批发").await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/suppliers",
            Some(json!({ "name": "城东批发" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn referenced_supplier_cannot_be_deleted() {
    let app = TestApp::new().await;
    let product = app.create_product("可乐", "可口可乐", None).await;
    let supplier = app.create_supplier("城东批发").await;
    app.inbound(&product, &supplier, 2).await;

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/v1/suppliers/{supplier}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn suppliers_are_listed_by_name() {
    let app = TestApp::new().await;
    app.create_supplier("c-supplier").await;
    app.create_supplier("a-supplier").await;
    app.create_supplier("b-supplier").await;

    let (_, body) = app.json(Method::GET, "/api/v1/suppliers", None).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a-supplier", "b-supplier", "c-supplier"]);
}
