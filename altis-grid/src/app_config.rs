use serde::Deserialize;
use std::env;

use crate::keys::DateNormalizer;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GridConfig {
    #[serde(default = "default_grid_name")]
    pub name: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            name: default_grid_name(),
        }
    }
}

fn default_grid_name() -> String {
    "AcmeAirGrid".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LookupConfig {
    /// Zone for matching departure dates, minutes east of UTC
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_true")]
    pub validate_airport_codes: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            validate_airport_codes: true,
        }
    }
}

fn default_true() -> bool { true }

impl LookupConfig {
    pub fn date_normalizer(&self) -> Result<DateNormalizer, config::ConfigError> {
        DateNormalizer::from_offset_minutes(self.utc_offset_minutes).ok_or_else(|| {
            config::ConfigError::Message(format!(
                "lookup.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `ALTIS_LOOKUP__UTC_OFFSET_MINUTES=-300`
            .add_source(config::Environment::with_prefix("ALTIS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
