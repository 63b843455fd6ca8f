//! Application configuration.

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use skinpilot_market::MarketClientConfig;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SKINPILOT_CONFIG";

/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Reference prices at or above this are shown as N/A. Default: 2000.
    #[serde(default = "default_reference_price_ceiling_usd")]
    pub reference_price_ceiling_usd: Decimal,
}

fn default_reference_price_ceiling_usd() -> Decimal {
    Decimal::from(2000)
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            reference_price_ceiling_usd: default_reference_price_ceiling_usd(),
        }
    }
}

/// Interactive view session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle time before a view stops accepting toggles (s). Default: 180.
    #[serde(default = "default_view_timeout_secs")]
    pub view_timeout_secs: u64,
}

fn default_view_timeout_secs() -> u64 {
    180
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            view_timeout_secs: default_view_timeout_secs(),
        }
    }
}

impl SessionConfig {
    pub fn view_timeout(&self) -> Duration {
        Duration::from_secs(self.view_timeout_secs)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Item catalog JSON file.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    /// Names suggested for an empty search.
    #[serde(default = "default_featured_items")]
    pub featured_items: Vec<String>,
    #[serde(default)]
    pub market: MarketClientConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_catalog_path() -> String {
    "data/items.json".to_string()
}

fn default_featured_items() -> Vec<String> {
    ["AWP | Dragon Lore", "AK-47 | Wild Lotus", "AK-47 | Gold Arabesque"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            featured_items: default_featured_items(),
            market: MarketClientConfig::default(),
            display: DisplayConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Path: `explicit` > `SKINPILOT_CONFIG` > `config/default.toml`. A
    /// named file must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&str>) -> AppResult<Self> {
        let named = explicit
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_ENV).ok());

        let config = match named {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => {
                tracing::warn!(path = DEFAULT_CONFIG_PATH, "Config file not found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Reject settings that would make every lookup fail or hang.
    pub fn validate(&self) -> AppResult<()> {
        if self.market.max_attempts == 0 {
            return Err(AppError::Config("market.max_attempts must be at least 1".to_string()));
        }
        if self.market.attempt_timeout_ms == 0 {
            return Err(AppError::Config("market.attempt_timeout_ms must be positive".to_string()));
        }
        if self.session.view_timeout_secs == 0 {
            return Err(AppError::Config("session.view_timeout_secs must be positive".to_string()));
        }
        if self.display.reference_price_ceiling_usd <= Decimal::ZERO {
            return Err(AppError::Config(
                "display.reference_price_ceiling_usd must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
