use serde::{Deserialize, Serialize};

/// Temperature display unit of a tag, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Unit from the stored controller flag: 0 is Celsius, anything else
    /// Fahrenheit.
    pub fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            Self::Celsius
        } else {
            Self::Fahrenheit
        }
    }

    pub fn flag(&self) -> i64 {
        match self {
            Self::Celsius => 0,
            Self::Fahrenheit => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }
}

impl Default for TemperatureUnit {
    fn default() -> Self {
        Self::Celsius
    }
}
