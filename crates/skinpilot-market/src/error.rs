//! Marketplace error types.

use skinpilot_core::{ErrorKind, QuoteFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Upstream unavailable after {attempts} attempts (last cause: {last_cause}): {message}")]
    UpstreamUnavailable {
        attempts: u32,
        last_cause: ErrorKind,
        message: String,
    },

    #[error("Payload decode error: {0}")]
    Decode(String),

    #[error("Lookup cancelled")]
    Cancelled,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl MarketError {
    /// Taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::Decode(_) => ErrorKind::DecodeError,
            Self::Cancelled => ErrorKind::Cancelled,
            // Never reached the wire.
            Self::InvalidRequest(_) | Self::HttpClient(_) => ErrorKind::TransportError,
        }
    }

    /// Convert into the failure record stored on a quote.
    pub fn to_failure(&self) -> QuoteFailure {
        let failure = QuoteFailure::new(self.kind(), self.to_string());
        match self {
            Self::UpstreamUnavailable { last_cause, .. } => failure.with_cause(*last_cause),
            _ => failure,
        }
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
