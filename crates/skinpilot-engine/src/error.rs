//! Engine error types.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Aggregation cancelled")]
    Cancelled,

    #[error("View session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("View session expired: {0}")]
    SessionExpired(Uuid),
}

pub type EngineResult<T> = Result<T, EngineError>;
