//! HTTP client for marketplace sell-order lookups.
//!
//! One call prices one goods id. The shared `reqwest::Client` is injected by
//! the host and reused by every concurrent lookup; this type keeps no other
//! state.

use crate::config::MarketClientConfig;
use crate::error::{MarketError, MarketResult};
use crate::payload::decode_sell_orders;
use crate::query::SellOrderQuery;
use crate::retry::{AttemptOutcome, RetryPolicy};
use reqwest::{Client, StatusCode, Url};
use skinpilot_core::{ErrorKind, MarketQuote, QuoteStatus};
use skinpilot_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Client for the marketplace sell-order endpoint.
#[derive(Clone)]
pub struct MarketplaceClient {
    /// Shared HTTP transport.
    http: Client,
    config: MarketClientConfig,
    retry: RetryPolicy,
}

impl MarketplaceClient {
    /// Create a client over an existing transport.
    pub fn new(http: Client, config: MarketClientConfig) -> Self {
        let retry = config.retry_policy();
        Self {
            http,
            config,
            retry,
        }
    }

    /// Build the shared transport described by `config`.
    ///
    /// No client-wide timeout is set; each attempt carries its own.
    pub fn build_http_client(config: &MarketClientConfig) -> MarketResult<Client> {
        Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| MarketError::HttpClient(format!("Failed to create HTTP client: {e}")))
    }

    pub fn config(&self) -> &MarketClientConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Full request URL for `goods_id` with the set refinements of `query`.
    pub fn sell_order_url(&self, goods_id: u64, query: &SellOrderQuery) -> MarketResult<Url> {
        let mut params = vec![
            ("game", self.config.game.clone()),
            ("goods_id", goods_id.to_string()),
        ];
        params.extend(query.to_params());

        Url::parse_with_params(&self.config.base_url, &params).map_err(|e| {
            MarketError::InvalidRequest(format!("bad base url {}: {e}", self.config.base_url))
        })
    }

    /// Price one goods id.
    ///
    /// Rate limits, transport failures and unexpected statuses are retried
    /// per the retry policy; only the final failure is returned. Decode
    /// failures are returned immediately.
    pub async fn fetch_quote(
        &self,
        goods_id: u64,
        query: &SellOrderQuery,
        cancel: &CancellationToken,
    ) -> MarketResult<MarketQuote> {
        let url = self.sell_order_url(goods_id, query)?;
        debug!(goods_id, %url, "Fetching sell orders");

        let result = self
            .retry
            .run(cancel, |attempt| self.attempt(&url, goods_id, attempt))
            .await;

        match &result {
            Ok(quote) => info!(
                goods_id,
                status = %quote.status,
                buff_price_usd = ?quote.buff_price_usd,
                "Sell-order lookup finished"
            ),
            Err(MarketError::Cancelled) => debug!(goods_id, "Sell-order lookup cancelled"),
            Err(e) => warn!(goods_id, error = %e, "Sell-order lookup failed"),
        }

        result
    }

    /// One HTTP round-trip, classified.
    async fn attempt(&self, url: &Url, goods_id: u64, attempt: u32) -> AttemptOutcome<MarketQuote> {
        let response = match self
            .http
            .get(url.clone())
            .timeout(self.config.attempt_timeout())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                Metrics::lookup_attempt(ErrorKind::TransportError.as_str());
                let reason = if e.is_timeout() {
                    "request timed out"
                } else {
                    "request failed"
                };
                return AttemptOutcome::Retryable(
                    ErrorKind::TransportError,
                    format!("{reason}: {e}"),
                );
            }
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            Metrics::lookup_attempt(ErrorKind::RateLimited.as_str());
            return AttemptOutcome::Retryable(ErrorKind::RateLimited, format!("HTTP {status}"));
        }
        if !status.is_success() {
            Metrics::lookup_attempt(ErrorKind::TransportError.as_str());
            let body = response.text().await.unwrap_or_default();
            return AttemptOutcome::Retryable(
                ErrorKind::TransportError,
                format!("HTTP {status}: {}", truncate(&body, 200)),
            );
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                Metrics::lookup_attempt(ErrorKind::TransportError.as_str());
                return AttemptOutcome::Retryable(
                    ErrorKind::TransportError,
                    format!("failed to read body: {e}"),
                );
            }
        };

        match decode_sell_orders(&body, goods_id) {
            Ok(quote) => {
                let outcome = match quote.status {
                    QuoteStatus::NotFound => QuoteStatus::NotFound.as_str(),
                    _ => QuoteStatus::Ok.as_str(),
                };
                Metrics::lookup_attempt(outcome);
                debug!(goods_id, attempt, status = %quote.status, "Decoded sell orders");
                AttemptOutcome::Done(quote)
            }
            Err(e) => {
                Metrics::lookup_attempt(ErrorKind::DecodeError.as_str());
                AttemptOutcome::Terminal(ErrorKind::DecodeError, e.to_string())
            }
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
