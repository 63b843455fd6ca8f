//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Market error: {0}")]
    Market(#[from] skinpilot_market::MarketError),

    #[error("Engine error: {0}")]
    Engine(#[from] skinpilot_engine::EngineError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] skinpilot_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
