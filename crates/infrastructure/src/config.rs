use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CloudConfig {
    /// Base URL of the tag manager service
    pub base_url: String,
    /// OAuth bearer token for the cloud account
    pub token: String,
    /// MAC of the tag manager, needed for light commands
    #[serde(default)]
    pub mac: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BridgeConfig {
    pub cloud: CloudConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Temperature display unit flag: 0 = Celsius, anything else Fahrenheit
    #[serde(default)]
    pub temperature_unit: i64,
    #[serde(default = "default_freshness_tick_secs")]
    pub freshness_tick_secs: u64,
}

fn default_freshness_tick_secs() -> u64 {
    30
}

impl BridgeConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("server.port", 3000)?
            // Base config file is required to avoid starting half-configured
            .add_source(File::with_name(&format!("{config_dir}/default")).required(true))
            .add_source(File::with_name(&format!("{config_dir}/{run_mode}")).required(false))
            // Environment variables (e.g. TAGBRIDGE__CLOUD__TOKEN=...)
            .add_source(Environment::with_prefix("TAGBRIDGE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
