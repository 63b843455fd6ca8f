//! Marketplace sell-order client for SkinPilot.
//!
//! Prices one goods id per call against the external sell-order endpoint,
//! with bounded retry, exponential backoff and rate-limit detection.

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod query;
pub mod retry;

pub use client::MarketplaceClient;
pub use config::MarketClientConfig;
pub use error::{MarketError, MarketResult};
pub use payload::{convert_to_usd, decode_sell_orders};
pub use query::{SellOrderQuery, SortOrder};
pub use retry::{AttemptOutcome, RetryPolicy};
