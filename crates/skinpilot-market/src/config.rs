//! Marketplace client configuration.

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Marketplace client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketClientConfig {
    /// Sell-order endpoint URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Game identifier sent with every request.
    #[serde(default = "default_game")]
    pub game: String,
    /// User-Agent header for the shared HTTP client.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-attempt timeout (ms). Default: 10,000.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    /// Total attempts per lookup. Default: 5.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Exponential backoff base. Default: 2.
    #[serde(default = "default_backoff_base")]
    pub backoff_base: u32,
    /// Backoff unit (ms). Default: 1,000 (waits of 2s, 4s, 8s, 16s).
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,
}

fn default_base_url() -> String {
    "https://buff.163.com/api/market/goods/sell_order".to_string()
}

fn default_game() -> String {
    "csgo".to_string()
}

fn default_user_agent() -> String {
    format!("skinpilot/{}", env!("CARGO_PKG_VERSION"))
}

fn default_attempt_timeout_ms() -> u64 {
    10_000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_base() -> u32 {
    2
}

fn default_backoff_unit_ms() -> u64 {
    1_000
}

impl Default for MarketClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            game: default_game(),
            user_agent: default_user_agent(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            max_attempts: default_max_attempts(),
            backoff_base: default_backoff_base(),
            backoff_unit_ms: default_backoff_unit_ms(),
        }
    }
}

impl MarketClientConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_base: self.backoff_base,
            backoff_unit: Duration::from_millis(self.backoff_unit_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_retry_policy_default() {
        let config = MarketClientConfig::default();
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.attempt_timeout(), Duration::from_secs(10));
    }
}
