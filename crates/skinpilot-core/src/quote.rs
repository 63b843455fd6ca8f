//! Price quotes and aggregation results.

use crate::variant::{ItemVariant, Wear};
use crate::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Placeholder shown for any missing price.
pub const NOT_AVAILABLE: &str = "N/A";

/// Outcome class of one variant lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Upstream returned at least one listing.
    Ok,
    /// Upstream answered but the market is empty. Not an error.
    NotFound,
    /// Lookup failed; see `PriceQuote::error`.
    Failed,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotFound => "not_found",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure taxonomy for marketplace lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Upstream throttled the request (HTTP 429).
    RateLimited,
    /// Connection failure, timeout or unexpected HTTP status.
    TransportError,
    /// Retry budget exhausted; the cause is carried alongside.
    UpstreamUnavailable,
    /// Successful response with a payload we cannot interpret.
    DecodeError,
    /// The driving request was cancelled before the lookup finished.
    Cancelled,
}

impl ErrorKind {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::TransportError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::TransportError => "transport_error",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::DecodeError => "decode_error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single variant lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteFailure {
    pub kind: ErrorKind,
    /// Last observed cause when `kind` is `UpstreamUnavailable`.
    pub cause: Option<ErrorKind>,
    pub message: String,
}

impl QuoteFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            cause: None,
            message: message.into(),
        }
    }

    pub fn with_cause(mut self, cause: ErrorKind) -> Self {
        self.cause = Some(cause);
        self
    }
}

impl fmt::Display for QuoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cause {
            Some(cause) => write!(f, "{} ({}): {}", self.kind, cause, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Successful answer from the marketplace for one goods id.
///
/// Variant-agnostic; the aggregator attaches it to its variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketQuote {
    /// `Ok` or `NotFound`.
    pub status: QuoteStatus,
    /// Lowest listing converted to USD. None when the FX ratio is unusable.
    pub buff_price_usd: Option<Price>,
    /// Reference price already quoted in USD.
    pub reference_price_usd: Option<Price>,
    pub image_url: Option<String>,
}

impl MarketQuote {
    /// Empty market for the requested goods id.
    pub fn not_found() -> Self {
        Self {
            status: QuoteStatus::NotFound,
            buff_price_usd: None,
            reference_price_usd: None,
            image_url: None,
        }
    }
}

/// Priced outcome for one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub variant: Arc<ItemVariant>,
    pub status: QuoteStatus,
    pub buff_price_usd: Option<Price>,
    pub reference_price_usd: Option<Price>,
    pub image_url: Option<String>,
    pub error: Option<QuoteFailure>,
}

impl PriceQuote {
    /// Attach a marketplace answer to its variant.
    pub fn from_market(variant: Arc<ItemVariant>, quote: MarketQuote) -> Self {
        Self {
            variant,
            status: quote.status,
            buff_price_usd: quote.buff_price_usd,
            reference_price_usd: quote.reference_price_usd,
            image_url: quote.image_url,
            error: None,
        }
    }

    /// Record a failed lookup. All price fields are empty.
    pub fn failed(variant: Arc<ItemVariant>, failure: QuoteFailure) -> Self {
        Self {
            variant,
            status: QuoteStatus::Failed,
            buff_price_usd: None,
            reference_price_usd: None,
            image_url: None,
            error: Some(failure),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == QuoteStatus::Ok
    }

    /// Buff price as shown to users: `$12.34` or `N/A`.
    pub fn buff_price_display(&self) -> String {
        self.buff_price_usd
            .map_or_else(|| NOT_AVAILABLE.to_string(), |p| p.to_usd_string())
    }

    #[inline]
    pub fn wear(&self) -> Option<Wear> {
        self.variant.wear
    }
}

/// All quotes for one canonical item lookup.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    pub canonical_name: String,
    /// One quote per resolved variant, in the variants' canonical order.
    pub quotes: Vec<PriceQuote>,
    pub fetched_at: DateTime<Utc>,
}

impl AggregationResult {
    pub fn new(canonical_name: impl Into<String>, quotes: Vec<PriceQuote>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            quotes,
            fetched_at: Utc::now(),
        }
    }

    pub fn empty(canonical_name: impl Into<String>) -> Self {
        Self::new(canonical_name, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Number of quotes with the given status.
    pub fn count_status(&self, status: QuoteStatus) -> usize {
        self.quotes.iter().filter(|q| q.status == status).count()
    }

    pub fn has_stattrak(&self) -> bool {
        self.quotes.iter().any(|q| q.variant.is_stattrak)
    }

    pub fn has_souvenir(&self) -> bool {
        self.quotes.iter().any(|q| q.variant.is_souvenir)
    }
}
