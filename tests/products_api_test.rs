mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn create_product_starts_with_zero_stock() {
    let app = TestApp::new().await;
    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "  雪碧 500ml ",
                "brand": "可口可乐",
                "category": "饮料",
                "purchasePrice": 2.5,
                "retailPrice": "3.50",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Product created");
    let data = &body["data"];
    assert_eq!(data["name"], "雪碧 500ml");
    assert_eq!(data["unit"], "个");
    assert_eq!(data["currentStock"], 0);
    assert_eq!(data["status"], "active");
    assert_eq!(decimal(&data["retailPrice"]), dec!(3.5));
    assert_eq!(decimal(&data["inputPrice"]), dec!(0));
}

#[tokio::test]
async fn duplicate_name_and_brand_is_rejected() {
    let app = TestApp::new().await;
    app.create_product("可乐", "可口可乐", None).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "可乐",
                "brand": "可口可乐",
                "category": "饮料",
                "purchasePrice": "2.00",
                "retailPrice": "3.00",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    // Same name under another brand is a different product
    app.create_product("可乐", "百事", None).await;
}

#[tokio::test]
async fn database_enforces_unique_active_name_and_brand() {
    let app = TestApp::new().await;
    let original = app.create_product("可乐", "可口可乐", None).await;
    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/api/v1/products/{original}"),
            Some(json!({ "status": "inactive" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Renaming onto an inactive product's name is allowed
    let renamed = app.create_product("雪碧", "可口可乐", None).await;
    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/v1/products/{renamed}"),
            Some(json!({ "name": "可乐" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Reactivating the original now collides with the unique index
    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/v1/products/{original}"),
            Some(json!({ "status": "active" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["message"], "Duplicate: Product 可乐 (可口可乐) already exists");

    let (_, body) = app
        .json(Method::GET, &format!("/api/v1/products/{original}"), None)
        .await;
    assert_eq!(body["data"]["status"], "inactive");
}

#[tokio::test]
async fn invalid_payloads_use_the_error_envelope() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "缺少品牌" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["requestId"].is_string());
    assert!(body["timestamp"].is_string());

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "   ",
                "brand": "某品牌",
                "category": "零食",
                "purchasePrice": 1,
                "retailPrice": 2,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "负价格",
                "brand": "某品牌",
                "category": "零食",
                "purchasePrice": -1,
                "retailPrice": 2,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(Method::GET, "/api/v1/products/not-a-uuid", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app
        .json(
            Method::GET,
            &format!("/api/v1/products/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn list_paginates_and_filters() {
    let app = TestApp::new().await;
    app.create_product("可乐", "可口可乐", Some(10)).await;
    app.create_product("雪碧", "可口可乐", None).await;
    app.create_product("美年达", "百事", None).await;

    let (status, body) = app
        .json(Method::GET, "/api/v1/products?page=1&limit=2", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["pagination"],
        json!({ "current": 1, "pageSize": 2, "total": 3, "pages": 2 })
    );

    let (_, body) = app
        .json(Method::GET, "/api/v1/products?brand=%E7%99%BE%E4%BA%8B", None)
        .await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "美年达");

    let (_, body) = app
        .json(Method::GET, "/api/v1/products?search=%E9%9B%AA", None)
        .await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "雪碧");

    // Only the product with an alert threshold is low at zero stock
    let (_, body) = app
        .json(Method::GET, "/api/v1/products?lowStock=true", None)
        .await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["isLowStock"], true);

    let (status, _) = app
        .json(Method::GET, "/api/v1/products?page=abc", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn huge_page_numbers_are_rejected_on_every_list() {
    let app = TestApp::new().await;
    app.create_product("可乐", "可口可乐", None).await;

    for path in [
        "/api/v1/products",
        "/api/v1/suppliers",
        "/api/v1/inbound",
        "/api/v1/outbound",
    ] {
        let uri = format!("{path}?page=18446744073709551615&limit=20");
        let (status, body) = app.json(Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {body}");
        assert_eq!(body["success"], false);
    }

    let (status, body) = app
        .json(Method::GET, "/api/v1/products?page=1000000&limit=20", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["current"], 1_000_000);
}

#[tokio::test]
async fn update_changes_master_data_but_never_stock() {
    let app = TestApp::new().await;
    let product = app.create_product("可乐", "可口可乐", None).await;

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/v1/products/{product}"),
            Some(json!({ "retailPrice": "4.00", "currentStock": 999, "stockAlert": 6 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(decimal(&body["data"]["retailPrice"]), dec!(4));
    assert_eq!(body["data"]["stockAlert"], 6);
    assert_eq!(body["data"]["currentStock"], 0);

    app.create_product("雪碧", "可口可乐", None).await;
    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/api/v1/products/{product}"),
            Some(json!({ "name": "雪碧" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn products_with_movements_cannot_be_deleted() {
    let app = TestApp::new().await;
    let moved = app.create_product("可乐", "可口可乐", None).await;
    let unused = app.create_product("雪碧", "可口可乐", None).await;
    let supplier = app.create_supplier("饮料批发").await;
    app.inbound(&moved, &supplier, 3).await;

    let (status, body) = app
        .json(Method::DELETE, &format!("/api/v1/products/{moved}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .json(Method::DELETE, &format!("/api/v1/products/{unused}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted");

    let (status, _) = app
        .json(Method::GET, &format!("/api/v1/products/{unused}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_and_brands_are_distinct_and_sorted() {
    let app = TestApp::new().await;
    app.create_product("可乐", "b-brand", None).await;
    app.create_product("雪碧", "a-brand", None).await;
    app.create_product("芬达", "a-brand", None).await;

    let (status, body) = app
        .json(Method::GET, "/api/v1/products/brands", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["a-brand", "b-brand"]));

    let (_, body) = app
        .json(Method::GET, "/api/v1/products/categories", None)
        .await;
    assert_eq!(body["data"], json!(["饮料"]));
}
