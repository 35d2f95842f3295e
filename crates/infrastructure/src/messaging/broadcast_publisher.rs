use async_trait::async_trait;
use tokio::sync::broadcast;

use domain::DomainEvent;
use domain::event::EventPublisher;

/// Publishes domain events onto a broadcast channel for in-process
/// subscribers (the server's SSE stream).
#[derive(Clone)]
pub struct BroadcastEventPublisher {
    tx: broadcast::Sender<DomainEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(
        &self,
        event: DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // A send error only means nobody is subscribed right now
        let _ = self.tx.send(event);
        Ok(())
    }
}
