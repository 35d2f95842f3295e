use serde::{Deserialize, Serialize};

/// One tag object as returned by the cloud tag manager.
///
/// Identity fields are filled in discovery responses; the telemetry fields
/// hold whatever the tag last reported and may all be absent. The same shape
/// comes back from immediate-postback and light commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagRecord {
    pub name: Option<String>,
    pub uuid: Option<String>,
    pub slave_id: Option<u32>,
    pub tag_type: Option<u16>,

    pub alive: Option<bool>,
    /// Celsius reading from the tag
    pub temperature: Option<f64>,
    pub battery_volt: Option<f64>,
    /// Remaining battery as a 0..=1 fraction
    pub battery_remaining: Option<f64>,
    pub lux: Option<f64>,
    /// Capacitive humidity reading
    pub cap: Option<f64>,
    /// LED lit flag
    pub lit: Option<bool>,
    pub event_state: Option<i64>,
    pub oor: Option<bool>,
    #[serde(rename = "signaldBm")]
    pub signal_dbm: Option<f64>,
    pub temp_event_state: Option<i64>,
    pub cap_event_state: Option<i64>,
    pub light_event_state: Option<i64>,
    /// Last tag-manager communication, 100ns file-time ticks
    pub last_comm: Option<i64>,
}
