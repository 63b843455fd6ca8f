//! Fan-out price aggregation.
//!
//! Every variant of an item is priced concurrently. Each lookup owns its
//! output slot, so the result keeps input order no matter which lookup
//! finishes first, and one failing variant never affects the others.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use skinpilot_core::{AggregationResult, ItemVariant, PriceQuote, QuoteStatus};
use skinpilot_market::{MarketError, SellOrderQuery};
use skinpilot_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::source::DynQuoteSource;

/// Prices all variants of one item through a shared [`QuoteSource`].
///
/// [`QuoteSource`]: crate::source::QuoteSource
#[derive(Clone)]
pub struct FanOutAggregator {
    source: DynQuoteSource,
    /// Refinements applied to every lookup.
    query: SellOrderQuery,
}

impl FanOutAggregator {
    pub fn new(source: DynQuoteSource) -> Self {
        Self {
            source,
            query: SellOrderQuery::new(),
        }
    }

    /// Apply `query` to every lookup of this aggregator.
    pub fn with_query(mut self, query: SellOrderQuery) -> Self {
        self.query = query;
        self
    }

    pub fn query(&self) -> &SellOrderQuery {
        &self.query
    }

    /// Price every variant, one quote per variant in input order.
    ///
    /// Per-variant failures are recorded on their quote. The only error is
    /// [`EngineError::Cancelled`], raised when `cancel` fires before all
    /// lookups settle.
    pub async fn aggregate(
        &self,
        canonical_name: &str,
        variants: Vec<ItemVariant>,
        cancel: &CancellationToken,
    ) -> EngineResult<AggregationResult> {
        if variants.is_empty() {
            debug!(canonical_name, "No variants to price");
            return Ok(AggregationResult::empty(canonical_name));
        }
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let started = Instant::now();
        let variant_count = variants.len();
        debug!(canonical_name, variant_count, "Fanning out lookups");

        let lookups = variants.into_iter().map(|variant| {
            let variant = Arc::new(variant);
            async move {
                let outcome = self
                    .source
                    .fetch_quote(variant.marketplace_id, &self.query, cancel)
                    .await;
                (variant, outcome)
            }
        });
        let outcomes = join_all(lookups).await;

        let cancelled = cancel.is_cancelled()
            || outcomes
                .iter()
                .any(|(_, outcome)| matches!(outcome, Err(MarketError::Cancelled)));
        if cancelled {
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
            Metrics::aggregation_latency("cancelled", latency_ms);
            info!(canonical_name, "Aggregation cancelled");
            return Err(EngineError::Cancelled);
        }

        let quotes: Vec<PriceQuote> = outcomes
            .into_iter()
            .map(|(variant, outcome)| match outcome {
                Ok(quote) => PriceQuote::from_market(variant, quote),
                Err(e) => {
                    warn!(
                        canonical_name,
                        marketplace_id = variant.marketplace_id,
                        error = %e,
                        "Variant lookup failed"
                    );
                    PriceQuote::failed(variant, e.to_failure())
                }
            })
            .collect();

        for quote in &quotes {
            Metrics::quote(quote.status.as_str());
        }

        let result = AggregationResult::new(canonical_name, quotes);
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        Metrics::aggregation_latency("completed", latency_ms);
        info!(
            canonical_name,
            variants = result.len(),
            ok = result.count_status(QuoteStatus::Ok),
            not_found = result.count_status(QuoteStatus::NotFound),
            failed = result.count_status(QuoteStatus::Failed),
            latency_ms,
            "Aggregation finished"
        );

        Ok(result)
    }
}
