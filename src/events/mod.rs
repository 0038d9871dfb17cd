use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::outbound_record::OutboundType;

/// Which ledger a movement event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MovementKind {
    Inbound,
    Outbound,
}

/// How a movement's stock effect was taken back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReversalKind {
    Deleted,
    Voided,
}

/// Domain events emitted after a transaction commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),
    SupplierCreated(Uuid),
    SupplierUpdated(Uuid),
    SupplierDeleted(Uuid),

    // Ledger events
    InboundRecorded {
        record_id: Uuid,
        product_id: Uuid,
        supplier_id: Uuid,
        quantity: i32,
    },
    OutboundRecorded {
        record_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        outbound_type: OutboundType,
    },
    MovementReversed {
        kind: MovementKind,
        record_id: Uuid,
        product_id: Uuid,
        reversal: ReversalKind,
    },
    StockAdjusted {
        product_id: Uuid,
        delta: i32,
        old_stock: i32,
        new_stock: i32,
        occurred_at: DateTime<Utc>,
    },
    LowStockReached {
        product_id: Uuid,
        current_stock: i32,
        stock_alert: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the consumer is gone.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropping domain event");
        }
    }

    /// Sends every event in order through `send_or_log`.
    pub async fn send_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.send_or_log(event).await;
        }
    }
}

/// Consumes domain events until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::LowStockReached {
                product_id,
                current_stock,
                stock_alert,
            } => {
                warn!(
                    %product_id,
                    current_stock,
                    stock_alert,
                    "Product reached its low-stock threshold"
                );
            }
            Event::StockAdjusted {
                product_id,
                delta,
                old_stock,
                new_stock,
                ..
            } => {
                info!(%product_id, delta, old_stock, new_stock, "Stock adjusted");
            }
            other => info!(event = ?other, "Domain event"),
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_survives_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        sender.send_or_log(Event::ProductCreated(Uuid::nil())).await;
        assert!(sender.send(Event::ProductDeleted(Uuid::nil())).await.is_err());
    }

    #[tokio::test]
    async fn send_all_preserves_order() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        sender
            .send_all([Event::ProductCreated(a), Event::ProductUpdated(b)])
            .await;
        assert_eq!(rx.recv().await, Some(Event::ProductCreated(a)));
        assert_eq!(rx.recv().await, Some(Event::ProductUpdated(b)));
    }
}
