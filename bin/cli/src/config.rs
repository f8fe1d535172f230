use config::{Config, ConfigError, Environment};
use raffle_utils::LogFormat;
use serde::Deserialize;

/// Settings read from `RAFFLE_*` environment variables.
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub rpc_url: String,
    pub contract_address: Option<String>,
    pub private_key: Option<String>,
    pub log_format: LogFormat,
    pub poll_interval_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("rpc_url", "http://127.0.0.1:8545")?
            .set_default("log_format", "Minimal")?
            .set_default("poll_interval_secs", 15)?
            .add_source(Environment::with_prefix("RAFFLE"))
            .build()?;

        config.try_deserialize()
    }
}
