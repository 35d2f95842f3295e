use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

use super::{AttributeKind, CapabilitySet, TemperatureUnit};

/// Freshness sentinel for a tag that has never reported.
pub const NEVER_REPORTED: i64 = -1;

/// In-memory state of one physical sensor tag.
///
/// Holds a value for every attribute slot in the tag's capability set and
/// nothing else. `tag_type` and `unit` never change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagState {
    tag_id: u32,
    tag_type: u16,
    unit: TemperatureUnit,
    uuid: String,
    name: String,
    address: String,
    capabilities: CapabilitySet,
    values: BTreeMap<AttributeKind, f64>,
    /// Unix seconds of the most recent reported activity, 0 = never
    last_update_epoch: i64,
}

impl TagState {
    /// Create a freshly discovered tag with default attribute values.
    pub fn new(
        tag_id: u32,
        tag_type: u16,
        unit: TemperatureUnit,
        uuid: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let capabilities = CapabilitySet::for_tag_type(tag_type)?;
        let values = capabilities
            .iter()
            .map(|kind| (kind, initial_value(kind)))
            .collect();
        let uuid = uuid.into();
        let address = address_from_uuid(&uuid);

        Ok(Self {
            tag_id,
            tag_type,
            unit,
            uuid,
            name: name.into(),
            address,
            capabilities,
            values,
            last_update_epoch: 0,
        })
    }

    /// Rebuild a tag from attribute values persisted by the host controller.
    ///
    /// Stored values for slots the type does not carry are dropped; kept
    /// values go through the same normalization as live readings.
    pub fn from_persisted(
        tag_id: u32,
        tag_type: u16,
        unit: TemperatureUnit,
        uuid: impl Into<String>,
        name: impl Into<String>,
        stored: &BTreeMap<AttributeKind, f64>,
        last_update_epoch: i64,
    ) -> Result<Self> {
        let mut state = Self::new(tag_id, tag_type, unit, uuid, name)?;
        for (kind, value) in stored {
            if state.capabilities.contains(*kind) {
                state.values.insert(*kind, kind.normalize(*value));
            }
        }
        state.last_update_epoch = last_update_epoch.max(0);
        state
            .values
            .insert(AttributeKind::LastUpdateTime, state.last_update_epoch as f64);
        Ok(state)
    }

    pub fn tag_id(&self) -> u32 {
        self.tag_id
    }

    pub fn tag_type(&self) -> u16 {
        self.tag_type
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host controller node address for this tag.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn last_update_epoch(&self) -> i64 {
        self.last_update_epoch
    }

    pub fn supports(&self, kind: AttributeKind) -> bool {
        self.capabilities.contains(kind)
    }

    /// Store a normalized value for `kind`. Rejected when the slot is not in
    /// this tag's capability set; repeating the same write is safe.
    pub fn set(&mut self, kind: AttributeKind, raw: f64) -> Result<f64> {
        if !self.capabilities.contains(kind) {
            return Err(DomainError::CapabilityMissing {
                kind,
                tag_type: self.tag_type,
            });
        }
        let value = kind.normalize(raw);
        self.values.insert(kind, value);
        Ok(value)
    }

    /// Current value of `kind`, `None` when the slot is not carried.
    pub fn get(&self, kind: AttributeKind) -> Option<f64> {
        self.values.get(&kind).copied()
    }

    /// Record externally-reported activity at `epoch_seconds`.
    pub fn touch(&mut self, epoch_seconds: i64) {
        self.last_update_epoch = epoch_seconds;
        self.values
            .insert(AttributeKind::LastUpdateTime, epoch_seconds as f64);
        self.refresh_freshness(epoch_seconds);
    }

    /// Seconds since the last reported activity, [`NEVER_REPORTED`] until the
    /// tag first reports.
    pub fn seconds_since_update(&self, now: i64) -> i64 {
        if self.last_update_epoch == 0 {
            NEVER_REPORTED
        } else {
            now - self.last_update_epoch
        }
    }

    /// Recompute the derived freshness slot. Runs after every touch and on
    /// the periodic tick.
    pub fn refresh_freshness(&mut self, now: i64) {
        let seconds = self.seconds_since_update(now);
        self.values
            .insert(AttributeKind::SecondsSinceUpdate, seconds as f64);
    }

    /// Read-only copy of the tag, as pushed to the host display.
    pub fn snapshot(&self) -> TagSnapshot {
        TagSnapshot {
            tag_id: self.tag_id,
            address: self.address.clone(),
            name: self.name.clone(),
            tag_type: self.tag_type,
            unit: self.unit,
            values: self.values.clone(),
            last_update_epoch: self.last_update_epoch,
        }
    }
}

/// Serializable read-only view of a tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSnapshot {
    pub tag_id: u32,
    pub address: String,
    pub name: String,
    pub tag_type: u16,
    pub unit: TemperatureUnit,
    pub values: BTreeMap<AttributeKind, f64>,
    pub last_update_epoch: i64,
}

/// Default value for a freshly created slot. The water state starts at 1
/// (dry) because the host display treats 0 as unknown and must never see it.
fn initial_value(kind: AttributeKind) -> f64 {
    match kind {
        AttributeKind::WaterEventState => 1.0,
        _ => 0.0,
    }
}

/// Host controller node address derived from the tag uuid: alphanumerics
/// only, truncated to the controller's 14-character limit.
fn address_from_uuid(uuid: &str) -> String {
    uuid.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(14)
        .collect::<String>()
        .to_ascii_lowercase()
}
