//! Plain-text table rendering of a view.

use rust_decimal::{Decimal, RoundingStrategy};
use skinpilot_core::{AggregationResult, FilterState, PriceQuote, Toggle, NOT_AVAILABLE};
use skinpilot_engine::{FacetAvailability, ViewSnapshot};
use std::fmt::Write as _;

const WEAR_WIDTH: usize = 18;
const BUFF_WIDTH: usize = 12;

/// Renders a view snapshot as a titled price table.
#[derive(Debug, Clone)]
pub struct TableRenderer {
    /// Reference prices at or above this are shown as N/A.
    reference_ceiling_usd: Decimal,
}

impl TableRenderer {
    pub fn new(reference_ceiling_usd: Decimal) -> Self {
        Self {
            reference_ceiling_usd,
        }
    }

    pub fn render(
        &self,
        result: &AggregationResult,
        view: &ViewSnapshot,
        availability: &FacetAvailability,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", title(result, &view.quotes));
        if let Some(image) = image_url(result, &view.quotes) {
            let _ = writeln!(out, "Image: {image}");
        }
        let _ = writeln!(out, "Filter: {}", describe_state(&view.state));
        if view.fell_back {
            let _ = writeln!(out, "No variants match this filter, showing the default view.");
        }
        out.push('\n');

        let _ = writeln!(
            out,
            "{:<WEAR_WIDTH$}| {:<BUFF_WIDTH$}| Steam Price",
            "Wear", "Buff Price"
        );
        let _ = writeln!(
            out,
            "{}|{}|{}",
            "-".repeat(WEAR_WIDTH),
            "-".repeat(BUFF_WIDTH + 1),
            "-".repeat(12)
        );
        for quote in &view.quotes {
            let _ = writeln!(
                out,
                "{:<WEAR_WIDTH$}| {:<BUFF_WIDTH$}| {}",
                row_label(quote),
                quote.buff_price_display(),
                self.reference_display(quote)
            );
        }
        if view.quotes.is_empty() {
            let _ = writeln!(out, "(no variants)");
        }

        let toggles = toggle_hint(availability);
        if !toggles.is_empty() {
            let _ = writeln!(out, "\nToggles: {toggles}");
        }
        out
    }

    /// Steam reference price, or N/A when missing or at/over the ceiling.
    pub fn reference_display(&self, quote: &PriceQuote) -> String {
        match quote.reference_price_usd {
            Some(price) if price.inner() < self.reference_ceiling_usd => {
                format_usd_grouped(price.inner())
            }
            _ => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Base name of the first visible variant, else the canonical name.
fn title(result: &AggregationResult, visible: &[PriceQuote]) -> String {
    visible
        .first()
        .map(|quote| quote.variant.base_name().to_string())
        .unwrap_or_else(|| result.canonical_name.clone())
}

/// First visible image, else the image of the best-wear plain variant.
fn image_url<'a>(result: &'a AggregationResult, visible: &'a [PriceQuote]) -> Option<&'a str> {
    if let Some(url) = visible.first().and_then(|q| q.image_url.as_deref()) {
        return Some(url);
    }
    result
        .quotes
        .iter()
        .filter(|q| q.variant.is_plain() && q.image_url.is_some())
        .min_by_key(|q| q.variant.wear.map_or(u8::MAX, |w| w.rank()))
        .and_then(|q| q.image_url.as_deref())
}

fn row_label(quote: &PriceQuote) -> String {
    let wear = quote.variant.wear.map_or("-", |w| w.label());
    if quote.variant.is_stattrak {
        format!("ST {wear}")
    } else if quote.variant.is_souvenir {
        format!("SV {wear}")
    } else {
        wear.to_string()
    }
}

fn describe_state(state: &FilterState) -> String {
    let mut parts = Vec::new();
    if state.stattrak_active() {
        parts.push("StatTrak".to_string());
    }
    if state.souvenir_active() {
        parts.push("Souvenir".to_string());
    }
    if let Some(wear) = state.active_wear() {
        parts.push(wear.label().to_string());
    }
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

fn toggle_hint(availability: &FacetAvailability) -> String {
    let mut hints: Vec<String> = availability
        .wears
        .iter()
        .map(|w| format!("[{}]", w.short_code().to_lowercase()))
        .collect();
    if availability.offers(Toggle::StatTrak) {
        hints.push("[st]".to_string());
    }
    if availability.offers(Toggle::Souvenir) {
        hints.push("[sv]".to_string());
    }
    hints.join(" ")
}

/// `$1,234.56`.
pub fn format_usd_grouped(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}
