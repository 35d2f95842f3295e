use crate::error::{DomainError, Result};

/// Named push callbacks sent by the cloud tag manager.
///
/// The wire names are the callback URL path segments the service registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushEvent {
    /// Plain value update, carries readings but no state transition
    Update,
    MotionDetected,
    MotionTimedOut,
    DoorOpened,
    DoorClosed,
    DoorOpenTooLong,
    OutOfRange,
    BackInRange,
    TempNormal,
    TempTooHigh,
    TempTooLow,
    TooHumid,
    TooDry,
    CapNormal,
    WaterDetected,
    WaterDried,
    /// Reserved by the tag manager, currently never acted on
    LowBattery,
    TooBright,
    TooDark,
    LightNormal,
}

impl PushEvent {
    pub fn parse(name: &str) -> Result<Self> {
        let event = match name {
            "update" => Self::Update,
            "motion_detected" => Self::MotionDetected,
            "motion_timedout" => Self::MotionTimedOut,
            "door_opened" => Self::DoorOpened,
            "door_closed" => Self::DoorClosed,
            "door_open_toolong" => Self::DoorOpenTooLong,
            "oor" => Self::OutOfRange,
            "back_in_range" => Self::BackInRange,
            "temp_normal" => Self::TempNormal,
            "temp_toohigh" => Self::TempTooHigh,
            "temp_toolow" => Self::TempTooLow,
            "too_humid" => Self::TooHumid,
            "too_dry" => Self::TooDry,
            "cap_normal" => Self::CapNormal,
            "water_detected" => Self::WaterDetected,
            "water_dried" => Self::WaterDried,
            "low_battery" => Self::LowBattery,
            "too_bright" => Self::TooBright,
            "too_dark" => Self::TooDark,
            "light_normal" => Self::LightNormal,
            _ => return Err(DomainError::UnknownEvent(name.to_string())),
        };
        Ok(event)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::MotionDetected => "motion_detected",
            Self::MotionTimedOut => "motion_timedout",
            Self::DoorOpened => "door_opened",
            Self::DoorClosed => "door_closed",
            Self::DoorOpenTooLong => "door_open_toolong",
            Self::OutOfRange => "oor",
            Self::BackInRange => "back_in_range",
            Self::TempNormal => "temp_normal",
            Self::TempTooHigh => "temp_toohigh",
            Self::TempTooLow => "temp_toolow",
            Self::TooHumid => "too_humid",
            Self::TooDry => "too_dry",
            Self::CapNormal => "cap_normal",
            Self::WaterDetected => "water_detected",
            Self::WaterDried => "water_dried",
            Self::LowBattery => "low_battery",
            Self::TooBright => "too_bright",
            Self::TooDark => "too_dark",
            Self::LightNormal => "light_normal",
        }
    }

    /// All known events, in wire order.
    pub const ALL: &[Self] = &[
        Self::Update,
        Self::MotionDetected,
        Self::MotionTimedOut,
        Self::DoorOpened,
        Self::DoorClosed,
        Self::DoorOpenTooLong,
        Self::OutOfRange,
        Self::BackInRange,
        Self::TempNormal,
        Self::TempTooHigh,
        Self::TempTooLow,
        Self::TooHumid,
        Self::TooDry,
        Self::CapNormal,
        Self::WaterDetected,
        Self::WaterDried,
        Self::LowBattery,
        Self::TooBright,
        Self::TooDark,
        Self::LightNormal,
    ];
}

impl std::fmt::Display for PushEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Motion / door state codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStatus {
    TimedOut = 0,
    Detected = 1,
    Open = 2,
    OpenTooLong = 3,
    Closed = 4,
}

impl MotionStatus {
    pub fn value(self) -> f64 {
        self as u8 as f64
    }
}

/// Alarm (event state) codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Armed = 1,
    Opened = 3,
    Closed = 4,
    DetectedMovement = 5,
}

impl AlarmState {
    pub fn value(self) -> f64 {
        self as u8 as f64
    }
}
