//! Scalar conversions applied to raw readings before storage.

use super::TemperatureUnit;

/// Offset in seconds between the tag manager's file-time epoch (1601-01-01)
/// and the Unix epoch.
const EPOCH_OFFSET_SECS: i64 = 11_644_477_200;

/// 100ns ticks per second.
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Round to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

/// Temperature as shown for a device, rounded to 1 decimal place.
///
/// Converted only when the reading is Celsius and the device displays
/// Fahrenheit; everything else passes through.
pub fn display_temperature(raw: f64, unit: TemperatureUnit, source_is_celsius: bool) -> f64 {
    let value = if source_is_celsius && unit == TemperatureUnit::Fahrenheit {
        celsius_to_fahrenheit(raw)
    } else {
        raw
    };
    round_to(value, 1)
}

/// Convert the tag manager's 100ns file-time ticks to Unix seconds.
pub fn windows_ticks_to_unix_seconds(ticks: i64) -> i64 {
    ticks / TICKS_PER_SECOND - EPOCH_OFFSET_SECS
}
