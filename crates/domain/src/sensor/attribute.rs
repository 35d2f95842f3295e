use serde::{Deserialize, Serialize};

use super::convert;

/// One reportable attribute slot of a sensor tag.
///
/// Which slots a tag actually carries is decided once by its type code, see
/// [`CapabilitySet`](super::CapabilitySet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Tag is alive and reachable from the tag manager
    Alive,
    Temperature,
    Humidity,
    Luminosity,
    /// LED on/off/flash state
    LightLevel,
    BatteryPercent,
    BatteryVolt,
    /// Motion / door state
    Motion,
    Orientation,
    AxisX,
    AxisY,
    AxisZ,
    /// Armed / opened / closed / detected-movement alarm state
    EventState,
    OutOfRange,
    SignalStrength,
    TempEventState,
    /// Capacitive (moisture) event state
    CapEventState,
    LightEventState,
    WaterEventState,
    /// Unix seconds of the last reported activity
    LastUpdateTime,
    /// Derived freshness counter, -1 until the tag first reports
    SecondsSinceUpdate,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Luminosity => "luminosity",
            Self::LightLevel => "light_level",
            Self::BatteryPercent => "battery_percent",
            Self::BatteryVolt => "battery_volt",
            Self::Motion => "motion",
            Self::Orientation => "orientation",
            Self::AxisX => "axis_x",
            Self::AxisY => "axis_y",
            Self::AxisZ => "axis_z",
            Self::EventState => "event_state",
            Self::OutOfRange => "out_of_range",
            Self::SignalStrength => "signal_strength",
            Self::TempEventState => "temp_event_state",
            Self::CapEventState => "cap_event_state",
            Self::LightEventState => "light_event_state",
            Self::WaterEventState => "water_event_state",
            Self::LastUpdateTime => "last_update_time",
            Self::SecondsSinceUpdate => "seconds_since_update",
        }
    }

    /// Decimal places kept when storing this attribute. `None` truncates to
    /// an integer.
    fn decimals(&self) -> Option<u32> {
        match self {
            Self::Temperature => Some(1),
            Self::Luminosity => Some(2),
            Self::BatteryPercent => Some(2),
            Self::BatteryVolt => Some(3),
            _ => None,
        }
    }

    /// Normalize a raw reading for storage.
    pub fn normalize(&self, raw: f64) -> f64 {
        match self.decimals() {
            Some(places) => convert::round_to(raw, places),
            None => raw.trunc(),
        }
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
