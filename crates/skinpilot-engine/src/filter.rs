//! Facet filter engine.
//!
//! Derives the visible subset of an aggregation result from a
//! [`FilterState`]. A state that matches nothing falls back to the default
//! (plain) view, so there is no empty display state.

use skinpilot_core::{AggregationResult, FilterState, ItemVariant, PriceQuote, Toggle, Wear};

/// Visible quotes plus whether the default view was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredView<'a> {
    pub quotes: Vec<&'a PriceQuote>,
    /// True when a non-default state matched nothing.
    pub fell_back: bool,
}

/// Derive the visible quotes for `state`.
pub fn visible_quotes<'a>(result: &'a AggregationResult, state: &FilterState) -> Vec<&'a PriceQuote> {
    derive_view(result, state).quotes
}

/// Derive the visible quotes for `state`, reporting fallback.
pub fn derive_view<'a>(result: &'a AggregationResult, state: &FilterState) -> FilteredView<'a> {
    if state.is_default() {
        return FilteredView {
            quotes: default_view(result),
            fell_back: false,
        };
    }

    let quotes: Vec<&PriceQuote> = result
        .quotes
        .iter()
        .filter(|quote| matches_state(&quote.variant, state))
        .collect();

    if quotes.is_empty() {
        FilteredView {
            quotes: default_view(result),
            fell_back: true,
        }
    } else {
        FilteredView {
            quotes,
            fell_back: false,
        }
    }
}

fn default_view(result: &AggregationResult) -> Vec<&PriceQuote> {
    result
        .quotes
        .iter()
        .filter(|quote| quote.variant.is_plain())
        .collect()
}

fn matches_state(variant: &ItemVariant, state: &FilterState) -> bool {
    let flavour = if state.stattrak_active() {
        variant.is_stattrak
    } else if state.souvenir_active() {
        variant.is_souvenir
    } else {
        variant.is_plain()
    };
    let wear = state
        .active_wear()
        .map_or(true, |active| variant.wear == Some(active));
    flavour && wear
}

/// Which facets have at least one variant in a result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetAvailability {
    /// Wears present, best first.
    pub wears: Vec<Wear>,
    pub stattrak: bool,
    pub souvenir: bool,
}

impl FacetAvailability {
    pub fn from_result(result: &AggregationResult) -> Self {
        let wears = Wear::ALL
            .into_iter()
            .filter(|wear| result.quotes.iter().any(|q| q.variant.wear == Some(*wear)))
            .collect();
        Self {
            wears,
            stattrak: result.has_stattrak(),
            souvenir: result.has_souvenir(),
        }
    }

    /// Whether `toggle` targets a facet present in the result.
    pub fn offers(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Wear(wear) => self.wears.contains(&wear),
            Toggle::StatTrak => self.stattrak,
            Toggle::Souvenir => self.souvenir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinpilot_core::{MarketQuote, QuoteStatus};
    use std::sync::Arc;

    fn quote(id: u64, wear: Option<Wear>, stattrak: bool, souvenir: bool) -> PriceQuote {
        let variant = ItemVariant {
            canonical_name: "M4A4 | Howl".to_string(),
            raw_name: format!("M4A4 | Howl #{id}"),
            marketplace_id: id,
            wear,
            is_stattrak: stattrak,
            is_souvenir: souvenir,
        };
        PriceQuote::from_market(Arc::new(variant), MarketQuote::not_found())
    }

    fn ids(quotes: &[&PriceQuote]) -> Vec<u64> {
        quotes.iter().map(|q| q.variant.marketplace_id).collect()
    }

    fn mixed() -> AggregationResult {
        AggregationResult::new(
            "M4A4 | Howl",
            vec![
                quote(1, Some(Wear::FactoryNew), false, false),
                quote(2, Some(Wear::FieldTested), false, false),
                quote(3, Some(Wear::FactoryNew), true, false),
                quote(4, Some(Wear::FieldTested), true, false),
            ],
        )
    }

    #[test]
    fn test_default_view_is_plain_quotes() {
        let result = mixed();
        let visible = visible_quotes(&result, &FilterState::new());
        assert_eq!(ids(&visible), vec![1, 2]);
    }

    #[test]
    fn test_stattrak_view() {
        let result = mixed();
        let mut state = FilterState::new();
        state.toggle_stattrak();
        assert_eq!(ids(&visible_quotes(&result, &state)), vec![3, 4]);
    }

    #[test]
    fn test_wear_and_stattrak_combine() {
        let result = mixed();
        let mut state = FilterState::new();
        state.toggle_stattrak();
        state.toggle_wear(Wear::FieldTested);
        assert_eq!(ids(&visible_quotes(&result, &state)), vec![4]);
    }

    #[test]
    fn test_wear_only_view_keeps_plain() {
        let result = mixed();
        let mut state = FilterState::new();
        state.toggle_wear(Wear::FactoryNew);
        assert_eq!(ids(&visible_quotes(&result, &state)), vec![1]);
    }

    #[test]
    fn test_souvenir_without_souvenir_quotes_falls_back() {
        let result = mixed();
        let mut state = FilterState::new();
        state.toggle_souvenir();

        let view = derive_view(&result, &state);
        assert!(view.fell_back);
        assert_eq!(ids(&view.quotes), vec![1, 2]);
    }

    #[test]
    fn test_missing_wear_falls_back() {
        let result = mixed();
        let mut state = FilterState::new();
        state.toggle_wear(Wear::BattleScarred);
        assert_eq!(ids(&visible_quotes(&result, &state)), vec![1, 2]);
    }

    #[test]
    fn test_failed_quotes_stay_visible() {
        let mut result = mixed();
        result.quotes[1].status = QuoteStatus::Failed;
        let visible = visible_quotes(&result, &FilterState::new());
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[1].status, QuoteStatus::Failed);
    }

    #[test]
    fn test_availability() {
        let availability = FacetAvailability::from_result(&mixed());
        assert_eq!(availability.wears, vec![Wear::FactoryNew, Wear::FieldTested]);
        assert!(availability.stattrak);
        assert!(!availability.souvenir);
        assert!(availability.offers(Toggle::Wear(Wear::FieldTested)));
        assert!(!availability.offers(Toggle::Wear(Wear::WellWorn)));
        assert!(!availability.offers(Toggle::Souvenir));
    }

    #[test]
    fn test_availability_of_empty_result() {
        let availability = FacetAvailability::from_result(&AggregationResult::empty("x"));
        assert_eq!(availability, FacetAvailability::default());
    }
}
