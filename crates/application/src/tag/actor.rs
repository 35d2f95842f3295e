use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use domain::DomainEvent;
use domain::error::{DomainError, Result};
use domain::event::EventPublisher;
use domain::manager::TagManagerClient;
use domain::sensor::{AttributeKind, EventRouter, PushParams, TagSnapshot, TagState};

/// LED modes accepted by the light command, in the host controller's value
/// encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightMode {
    Off = 0,
    On = 1,
    Flash = 2,
}

impl LightMode {
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            2 => Some(Self::Flash),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        self as u8 as f64
    }
}

/// Commands processed by a [`TagActor`], strictly one at a time.
#[derive(Debug)]
pub enum TagCommand {
    /// Push callback from the tag manager
    Push {
        event: String,
        params: PushParams,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Immediate poll of the tag manager and re-ingestion of the result
    Query { reply: oneshot::Sender<Result<()>> },
    /// LED control; rolled back if the upstream command fails
    SetLight {
        mode: LightMode,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Read-only copy of all current attribute values
    Snapshot { reply: oneshot::Sender<TagSnapshot> },
}

/// Channel handle to a running [`TagActor`].
#[derive(Debug, Clone)]
pub struct TagHandle {
    tag_id: u32,
    address: String,
    name: String,
    tx: mpsc::Sender<TagCommand>,
}

impl TagHandle {
    pub fn tag_id(&self) -> u32 {
        self.tag_id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn push(&self, event: impl Into<String>, params: PushParams) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(TagCommand::Push {
            event: event.into(),
            params,
            reply,
        })
        .await?;
        rx.await.map_err(|_| self.gone())?
    }

    pub async fn query(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(TagCommand::Query { reply }).await?;
        rx.await.map_err(|_| self.gone())?
    }

    pub async fn set_light(&self, mode: LightMode) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(TagCommand::SetLight { mode, reply }).await?;
        rx.await.map_err(|_| self.gone())?
    }

    pub async fn snapshot(&self) -> Result<TagSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(TagCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| self.gone())
    }

    async fn send(&self, command: TagCommand) -> Result<()> {
        self.tx.send(command).await.map_err(|_| self.gone())
    }

    fn gone(&self) -> DomainError {
        DomainError::TagNotFound(self.address.clone())
    }
}

/// Actor owning the state of a single tag.
///
/// Pushes, queries, light commands, and the periodic freshness tick all flow
/// through this actor's channel, so mutations for one device never
/// interleave.
pub struct TagActor {
    state: TagState,
    router: EventRouter,
    client: Arc<dyn TagManagerClient>,
    publisher: Arc<dyn EventPublisher>,
    rx: mpsc::Receiver<TagCommand>,
    cancel_token: CancellationToken,
    tick_interval: Duration,
}

impl TagActor {
    pub fn new(
        state: TagState,
        client: Arc<dyn TagManagerClient>,
        publisher: Arc<dyn EventPublisher>,
        cancel_token: CancellationToken,
        tick_interval: Duration,
    ) -> (Self, TagHandle) {
        let (tx, rx) = mpsc::channel(32);
        let handle = TagHandle {
            tag_id: state.tag_id(),
            address: state.address().to_string(),
            name: state.name().to_string(),
            tx,
        };
        let actor = Self {
            state,
            router: EventRouter::new(),
            client,
            publisher,
            rx,
            cancel_token,
            tick_interval,
        };
        (actor, handle)
    }

    pub async fn run(mut self) {
        info!(
            tag_id = self.state.tag_id(),
            address = %self.state.address(),
            tag_type = self.state.tag_type(),
            "Starting tag actor"
        );

        let mut tick = tokio::time::interval(self.tick_interval);

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!(address = %self.state.address(), "Shutdown signal received");
                    break;
                }
                _ = tick.tick() => {
                    self.state.refresh_freshness(Utc::now().timestamp());
                }
                command = self.rx.recv() => {
                    match command {
                        Some(command) => self.process(command).await,
                        None => break,
                    }
                }
            }
        }
    }

    async fn process(&mut self, command: TagCommand) {
        match command {
            TagCommand::Push {
                event,
                params,
                reply,
            } => {
                let _ = reply.send(self.handle_push(&event, &params).await);
            }
            TagCommand::Query { reply } => {
                let _ = reply.send(self.refresh().await);
            }
            TagCommand::SetLight { mode, reply } => {
                let _ = reply.send(self.set_light(mode).await);
            }
            TagCommand::Snapshot { reply } => {
                let _ = reply.send(self.state.snapshot());
            }
        }
    }

    async fn handle_push(&mut self, event: &str, params: &PushParams) -> Result<()> {
        let before = self.state.snapshot();
        let result = self
            .router
            .handle(&mut self.state, event, params, Utc::now().timestamp());
        if let Err(e) = &result {
            warn!(address = %self.state.address(), error = %e, "Push callback not fully applied");
        }
        self.publish_changes(&before, false).await;
        result
    }

    /// Immediate poll of the tag manager, then full-state ingestion.
    async fn refresh(&mut self) -> Result<()> {
        let record = self
            .client
            .request_immediate_postback(self.state.tag_id())
            .await?;
        let before = self.state.snapshot();
        self.router
            .ingest(&mut self.state, &record, Utc::now().timestamp());
        self.publish_changes(&before, true).await;
        Ok(())
    }

    async fn set_light(&mut self, mode: LightMode) -> Result<()> {
        let before = self.state.snapshot();
        let saved = self.state.get(AttributeKind::LightLevel);
        let _ = self.state.set(AttributeKind::LightLevel, mode.value());

        let outcome = match mode {
            LightMode::Off => self.client.light_off(self.state.tag_id()).await,
            LightMode::On => self.client.light_on(self.state.tag_id(), false).await,
            LightMode::Flash => self.client.light_on(self.state.tag_id(), true).await,
        };

        match outcome {
            Ok(record) => {
                self.router
                    .ingest(&mut self.state, &record, Utc::now().timestamp());
                self.publish_changes(&before, true).await;
                Ok(())
            }
            Err(e) => {
                // Command failed, restore the previous value
                if let Some(previous) = saved {
                    let _ = self.state.set(AttributeKind::LightLevel, previous);
                }
                warn!(address = %self.state.address(), error = %e, "Light command failed");
                Err(e)
            }
        }
    }

    /// Publish one AttributeUpdated per changed slot; `full` additionally
    /// reports the whole snapshot.
    async fn publish_changes(&self, before: &TagSnapshot, full: bool) {
        let after = self.state.snapshot();
        let mut events = Vec::new();
        for (kind, value) in &after.values {
            if before.values.get(kind) != Some(value) {
                events.push(DomainEvent::attribute_updated(
                    after.tag_id,
                    after.address.clone(),
                    *kind,
                    *value,
                ));
            }
        }
        if full {
            events.push(DomainEvent::snapshot_reported(after));
        }
        if events.is_empty() {
            return;
        }
        if let Err(e) = self.publisher.publish_batch(events).await {
            warn!(address = %self.state.address(), "Failed to publish events: {}", e);
        }
    }
}
