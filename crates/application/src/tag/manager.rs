use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use domain::DomainEvent;
use domain::error::{DomainError, Result};
use domain::event::EventPublisher;
use domain::manager::TagManagerClient;
use domain::sensor::{
    EventRouter, PushParams, TagRecord, TagSnapshot, TagState, TemperatureUnit,
};

use super::{LightMode, TagActor, TagHandle};

/// Creates one [`TagActor`] per physical tag and routes work to it by
/// controller address. Distinct tags are fully parallel.
pub struct TagManager {
    client: Arc<dyn TagManagerClient>,
    publisher: Arc<dyn EventPublisher>,
    unit: TemperatureUnit,
    tick_interval: Duration,
    cancel_token: CancellationToken,
    actors: DashMap<String, (TagHandle, JoinHandle<()>)>,
}

impl TagManager {
    pub fn new(
        client: Arc<dyn TagManagerClient>,
        publisher: Arc<dyn EventPublisher>,
        unit: TemperatureUnit,
        tick_interval: Duration,
    ) -> Self {
        Self {
            client,
            publisher,
            unit,
            tick_interval,
            cancel_token: CancellationToken::new(),
            actors: DashMap::new(),
        }
    }

    /// Discover tags at the tag manager and start an actor for each one not
    /// yet running. Returns how many were started.
    pub async fn sync_tags(&self) -> Result<usize> {
        let records = self.client.tag_list().await?;
        let mut started = 0;
        for record in records {
            match self.start_from_record(&record).await {
                Ok(true) => started += 1,
                Ok(false) => {}
                Err(e) => warn!(error = %e, "Skipping tag from discovery"),
            }
        }
        Ok(started)
    }

    /// Recreate tags from snapshots persisted by the host controller.
    pub async fn restore_tags(&self, snapshots: Vec<TagSnapshot>) -> Result<usize> {
        let mut restored = 0;
        for snapshot in snapshots {
            let state = TagState::from_persisted(
                snapshot.tag_id,
                snapshot.tag_type,
                snapshot.unit,
                // The uuid is not persisted; the stored address stands in,
                // it maps to the same controller node
                snapshot.address.clone(),
                snapshot.name.clone(),
                &snapshot.values,
                snapshot.last_update_epoch,
            )?;
            if self.spawn(state).await? {
                restored += 1;
            }
        }
        Ok(restored)
    }

    async fn start_from_record(&self, record: &TagRecord) -> Result<bool> {
        let tag_id = record
            .slave_id
            .ok_or_else(|| DomainError::InvalidRecord("missing slaveId".to_string()))?;
        let tag_type = record
            .tag_type
            .ok_or_else(|| DomainError::InvalidRecord("missing tagType".to_string()))?;
        let uuid = record
            .uuid
            .clone()
            .ok_or_else(|| DomainError::InvalidRecord("missing uuid".to_string()))?;
        let name = record.name.clone().unwrap_or_else(|| format!("tag-{tag_id}"));

        let mut state = TagState::new(tag_id, tag_type, self.unit, uuid, name)?;
        // Seed the fresh device with whatever the discovery record carries
        EventRouter::new().ingest(&mut state, record, Utc::now().timestamp());
        self.spawn(state).await
    }

    async fn spawn(&self, state: TagState) -> Result<bool> {
        let address = state.address().to_string();
        if self.actors.contains_key(&address) {
            return Ok(false);
        }

        let discovered =
            DomainEvent::tag_discovered(state.tag_id(), address.clone(), state.tag_type());
        let (actor, handle) = TagActor::new(
            state,
            self.client.clone(),
            self.publisher.clone(),
            self.cancel_token.child_token(),
            self.tick_interval,
        );
        let join = tokio::spawn(actor.run());
        self.actors.insert(address, (handle, join));

        if let Err(e) = self.publisher.publish(discovered).await {
            warn!("Failed to publish discovery event: {}", e);
        }
        Ok(true)
    }

    fn handle_for(&self, address: &str) -> Result<TagHandle> {
        self.actors
            .get(address)
            .map(|entry| entry.value().0.clone())
            .ok_or_else(|| DomainError::TagNotFound(address.to_string()))
    }

    /// Route a push callback to the tag at `address`.
    pub async fn push(&self, address: &str, event: &str, params: PushParams) -> Result<()> {
        self.handle_for(address)?.push(event, params).await
    }

    /// Trigger an immediate poll for the tag at `address`.
    pub async fn query(&self, address: &str) -> Result<()> {
        self.handle_for(address)?.query().await
    }

    pub async fn set_light(&self, address: &str, mode: LightMode) -> Result<()> {
        self.handle_for(address)?.set_light(mode).await
    }

    pub async fn snapshot(&self, address: &str) -> Result<TagSnapshot> {
        self.handle_for(address)?.snapshot().await
    }

    /// Snapshots of every running tag, ordered by address.
    pub async fn snapshots(&self) -> Vec<TagSnapshot> {
        let handles: Vec<TagHandle> = self
            .actors
            .iter()
            .map(|entry| entry.value().0.clone())
            .collect();

        let mut snapshots = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.snapshot().await {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!(address = %handle.address(), error = %e, "Snapshot failed"),
            }
        }
        snapshots.sort_by(|a, b| a.address.cmp(&b.address));
        snapshots
    }

    pub fn tag_count(&self) -> usize {
        self.actors.len()
    }

    /// Stop every actor and forget it.
    pub async fn stop_all(&self) {
        self.cancel_token.cancel();
        let addresses: Vec<String> = self.actors.iter().map(|e| e.key().clone()).collect();
        for address in addresses {
            if let Some((_, (_, join))) = self.actors.remove(&address) {
                info!(address = %address, "Stopping tag actor");
                let _ = join.await;
            }
        }
    }
}
