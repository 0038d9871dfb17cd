pub mod common;
pub mod inbound;
pub mod outbound;
pub mod products;
pub mod reports;
pub mod suppliers;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    repositories::SeaOrmReportSource,
    services::{
        movements::MovementService, products::ProductService, reports::ReportService,
        suppliers::SupplierService,
    },
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub suppliers: Arc<SupplierService>,
    pub movements: Arc<MovementService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let report_source = Arc::new(SeaOrmReportSource::new(db.clone()));
        Self {
            products: Arc::new(ProductService::new(db.clone(), event_sender.clone())),
            suppliers: Arc::new(SupplierService::new(db.clone(), event_sender.clone())),
            movements: Arc::new(MovementService::new(db, event_sender)),
            reports: Arc::new(ReportService::new(
                report_source,
                config.dashboard_hot_days,
                config.dashboard_trend_days,
            )),
        }
    }
}
