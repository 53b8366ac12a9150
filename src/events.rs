use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted by the services after a successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),
    ScanApplied {
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    },
    OrderFinalized(Uuid),
    StockCheckedIn {
        product_id: Uuid,
        quantity: i32,
    },
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing the caller when the
    /// processing loop is gone. Event delivery never gates a transaction.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropped domain event");
        }
    }
}

/// Drains the event channel for the lifetime of the process. The listing
/// side of the system has no event consumers yet, so this loop only records
/// what happened for observability.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated(order_id) => {
                info!(order_id = %order_id, "Order created");
            }
            Event::ScanApplied {
                order_id,
                product_id,
                quantity,
            } => {
                info!(order_id = %order_id, product_id = %product_id, quantity, "Scan applied");
            }
            Event::OrderFinalized(order_id) => {
                info!(order_id = %order_id, "Order finalized");
            }
            Event::StockCheckedIn {
                product_id,
                quantity,
            } => {
                info!(product_id = %product_id, quantity, "Stock checked in");
            }
            Event::ProductCreated(product_id) => {
                info!(product_id = %product_id, "Product created");
            }
            Event::ProductUpdated(product_id) => {
                info!(product_id = %product_id, "Product updated");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_survives_a_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);
        drop(rx);

        // Must not panic or error out of the caller.
        sender.send_or_log(Event::OrderCreated(Uuid::new_v4())).await;
        assert!(sender.send(Event::OrderFinalized(Uuid::new_v4())).await.is_err());
    }
}
