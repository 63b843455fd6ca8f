//! Quote source trait for per-variant lookups.
//!
//! The aggregator only needs "price this marketplace id"; the trait keeps the
//! HTTP client swappable so fan-out behavior can be tested without a network.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use skinpilot_core::{ErrorKind, MarketQuote, Price, QuoteStatus};
use skinpilot_market::{MarketError, MarketResult, MarketplaceClient, SellOrderQuery};
use tokio_util::sync::CancellationToken;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Prices a single marketplace id.
///
/// Implementations own their retry policy and must return
/// `MarketError::Cancelled` promptly once `cancel` fires.
pub trait QuoteSource: Send + Sync {
    fn fetch_quote<'a>(
        &'a self,
        marketplace_id: u64,
        query: &'a SellOrderQuery,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, MarketResult<MarketQuote>>;
}

impl QuoteSource for MarketplaceClient {
    fn fetch_quote<'a>(
        &'a self,
        marketplace_id: u64,
        query: &'a SellOrderQuery,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, MarketResult<MarketQuote>> {
        Box::pin(MarketplaceClient::fetch_quote(self, marketplace_id, query, cancel))
    }
}

/// Arc wrapper for QuoteSource trait objects.
pub type DynQuoteSource = Arc<dyn QuoteSource>;

/// Scripted reply of [`MockQuoteSource`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Lookup succeeds with this quote.
    Quote(MarketQuote),
    /// Retry budget exhausted with this last cause.
    Unavailable(ErrorKind),
    /// Payload could not be decoded.
    Malformed(String),
}

impl MockResponse {
    /// Priced quote with a reference price and image.
    pub fn priced(buff_usd: Price, reference_usd: Price, image_url: &str) -> Self {
        Self::Quote(MarketQuote {
            status: QuoteStatus::Ok,
            buff_price_usd: Some(buff_usd),
            reference_price_usd: Some(reference_usd),
            image_url: Some(image_url.to_string()),
        })
    }

    fn into_result(self, attempts: u32) -> MarketResult<MarketQuote> {
        match self {
            Self::Quote(quote) => Ok(quote),
            Self::Unavailable(last_cause) => Err(MarketError::UpstreamUnavailable {
                attempts,
                last_cause,
                message: format!("mock {last_cause}"),
            }),
            Self::Malformed(message) => Err(MarketError::Decode(message)),
        }
    }
}

/// Mock quote source for testing.
///
/// Unscripted ids answer `NotFound`.
#[derive(Debug, Default)]
pub struct MockQuoteSource {
    responses: parking_lot::Mutex<HashMap<u64, MockResponse>>,
    delays: parking_lot::Mutex<HashMap<u64, Duration>>,
    /// Recorded lookups in call order.
    calls: parking_lot::Mutex<Vec<u64>>,
}

impl MockQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply for `marketplace_id`.
    pub fn set_response(&self, marketplace_id: u64, response: MockResponse) {
        self.responses.lock().insert(marketplace_id, response);
    }

    /// Delay the reply for `marketplace_id`. The delay honors cancellation.
    pub fn set_delay(&self, marketplace_id: u64, delay: Duration) {
        self.delays.lock().insert(marketplace_id, delay);
    }

    /// Get recorded lookups.
    pub fn calls(&self) -> Vec<u64> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl QuoteSource for MockQuoteSource {
    fn fetch_quote<'a>(
        &'a self,
        marketplace_id: u64,
        _query: &'a SellOrderQuery,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, MarketResult<MarketQuote>> {
        Box::pin(async move {
            self.calls.lock().push(marketplace_id);

            let delay = self.delays.lock().get(&marketplace_id).copied();
            if let Some(delay) = delay {
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = cancel.cancelled() => return Err(MarketError::Cancelled),
                }
            }
            if cancel.is_cancelled() {
                return Err(MarketError::Cancelled);
            }

            let response = self.responses.lock().get(&marketplace_id).cloned();
            match response {
                Some(response) => response.into_result(5),
                None => Ok(MarketQuote::not_found()),
            }
        })
    }
}
