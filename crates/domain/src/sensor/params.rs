use serde::{Deserialize, Serialize};

/// Optional reading fields attached to a push callback.
///
/// The tag manager sends whichever fields the tag carries; absent fields are
/// simply not applied. These are independent of the event name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushParams {
    /// Temperature already in Celsius, applied without conversion
    pub tempc: Option<f64>,
    /// Temperature already in Fahrenheit, applied without conversion
    pub tempf: Option<f64>,
    /// Temperature in Celsius, converted to the display unit
    pub temp: Option<f64>,
    pub hum: Option<f64>,
    pub lux: Option<f64>,
    pub orien: Option<f64>,
    pub xaxis: Option<f64>,
    pub yaxis: Option<f64>,
    pub zaxis: Option<f64>,
}

impl PushParams {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
