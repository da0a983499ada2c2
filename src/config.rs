use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::page::flash::FLASH_TIMEOUT;

/// Application keys read from the same figment as Rocket's own settings
/// (`Rocket.toml`, `ROCKET_*` environment variables).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub page_size: u64,
    pub flash_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data").join("bumdes.sqlite"),
            page_size: 10,
            flash_timeout_ms: u64::try_from(FLASH_TIMEOUT.as_millis()).unwrap_or(3000),
        }
    }
}

impl AppConfig {
    pub fn page_size(&self) -> u64 {
        self.page_size.max(1)
    }

    pub fn flash_timeout(&self) -> Duration {
        Duration::from_millis(self.flash_timeout_ms)
    }
}
