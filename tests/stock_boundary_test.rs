mod common;

use std::{sync::Arc, time::Duration};

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::TestApp;
use rstest::rstest;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use storeledger_api::{
    db::{self, DbConfig},
    errors::ServiceError,
    events::EventSender,
    services::{
        products::{CreateProductInput, ProductService},
        stock::StockReconciler,
    },
};
use tokio::sync::mpsc;
use uuid::Uuid;

#[rstest]
#[case::exactly_all_stock(20, 20, StatusCode::CREATED, 0)]
#[case::one_more_than_stock(20, 21, StatusCode::BAD_REQUEST, 20)]
#[case::single_unit(1, 1, StatusCode::CREATED, 0)]
#[case::empty_shelf(0, 1, StatusCode::BAD_REQUEST, 0)]
#[tokio::test]
async fn outbound_boundary(
    #[case] stock: i32,
    #[case] requested: i32,
    #[case] expected: StatusCode,
    #[case] remaining: i64,
) {
    let app = TestApp::new().await;
    let product = app.create_product("口香糖", "绿箭", None).await;
    if stock > 0 {
        let supplier = app.create_supplier("箭牌经销商").await;
        let (status, _) = app.inbound(&product, &supplier, stock).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.outbound(&product, requested).await;
    assert_eq!(status, expected, "{body}");
    assert_eq!(app.stock_of(&product).await, remaining);

    if expected == StatusCode::BAD_REQUEST {
        assert_eq!(
            body["message"],
            format!("库存不足，当前库存：{stock}，需要出库：{requested}")
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_outbounds_never_oversell() {
    const STOCK: i32 = 23;
    const QUANTITY: i32 = 4;
    const ATTEMPTS: usize = 10;

    let app = TestApp::new().await;
    let product = app.create_product("冰红茶", "康师傅", None).await;
    let supplier = app.create_supplier("康师傅饮品").await;
    app.inbound(&product, &supplier, STOCK).await;

    let product_id: uuid::Uuid = product.parse().unwrap();
    let movements = app.state.services.movements.clone();
    let mut tasks = Vec::new();
    for _ in 0..ATTEMPTS {
        let movements = movements.clone();
        tasks.push(tokio::spawn(async move {
            movements
                .create_outbound(storeledger_api::services::movements::CreateOutboundInput {
                    product_id,
                    quantity: QUANTITY,
                    unit_price: rust_decimal::Decimal::ONE,
                    ..Default::default()
                })
                .await
        }));
    }

    let mut successes = 0;
    let mut rejections = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(storeledger_api::errors::ServiceError::InsufficientStock { .. }) => {
                rejections += 1
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, (STOCK / QUANTITY) as usize);
    assert_eq!(rejections, ATTEMPTS - (STOCK / QUANTITY) as usize);
    assert_eq!(app.stock_of(&product).await, (STOCK % QUANTITY) as i64);
}

/// A file-backed database with a real multi-connection pool, so two
/// transactions can be open at the same time.
async fn shared_database(dir: &tempfile::TempDir) -> DatabaseConnection {
    let config = DbConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("ledger.db").display()),
        max_connections: 4,
        min_connections: 1,
        ..Default::default()
    };
    let pool = db::establish_connection_with_config(&config).await.unwrap();
    pool.execute_unprepared("PRAGMA journal_mode=WAL").await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

async fn product_with_stock(pool: &DatabaseConnection, stock: i32) -> Uuid {
    let (tx, _rx) = mpsc::channel(16);
    let products = ProductService::new(Arc::new(pool.clone()), Arc::new(EventSender::new(tx)));
    let product = products
        .create_product(CreateProductInput {
            name: "营养快线".into(),
            brand: "娃哈哈".into(),
            category: "饮料".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    StockReconciler::apply(pool, product.id, stock).await.unwrap();
    product.id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn open_transactions_cannot_both_take_the_same_stock() {
    let dir = tempfile::tempdir().unwrap();
    let pool = shared_database(&dir).await;
    let product_id = product_with_stock(&pool, 20).await;

    let first = pool.begin().await.unwrap();
    let change = StockReconciler::apply(&first, product_id, -15).await.unwrap();
    assert_eq!(change.after, 5);

    // The second transaction starts while the first is still uncommitted
    let second = tokio::spawn({
        let pool = pool.clone();
        async move {
            let txn = pool.begin().await?;
            let result = StockReconciler::apply(&txn, product_id, -15).await;
            match result {
                Ok(change) => {
                    txn.commit().await?;
                    Ok::<_, ServiceError>(change)
                }
                Err(e) => {
                    txn.rollback().await?;
                    Err(e)
                }
            }
        }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    first.commit().await.unwrap();

    let outcome = second.await.unwrap();
    assert_matches!(
        outcome,
        Err(ServiceError::InsufficientStock {
            current: 5,
            requested: 15,
            ..
        })
    );

    let settled = StockReconciler::apply(&pool, product_id, 0).await.unwrap();
    assert_eq!(settled.after, 5);
}
