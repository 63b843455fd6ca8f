//! Sell-order query refinements.
//!
//! Every refinement is optional. Unset refinements never reach the query
//! string, not even as empty values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    FloatAsc,
    FloatDesc,
}

impl SortOrder {
    /// Upstream `sort_by` value.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceAsc => "price.asc",
            Self::PriceDesc => "price.desc",
            Self::FloatAsc => "paintwear.asc",
            Self::FloatDesc => "paintwear.desc",
        }
    }
}

/// Optional refinements for one sell-order lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellOrderQuery {
    #[serde(default)]
    pub sort_by: Option<SortOrder>,
    /// Float-wear range.
    #[serde(default)]
    pub min_paintwear: Option<Decimal>,
    #[serde(default)]
    pub max_paintwear: Option<Decimal>,
    /// Style filter.
    #[serde(default)]
    pub tags_id: Option<String>,
    #[serde(default)]
    pub name_tag: Option<String>,
    /// Sticker filter.
    #[serde(default)]
    pub extra_tag_id: Option<String>,
    #[serde(default)]
    pub paintseed_group: Option<String>,
    #[serde(default)]
    pub paintseed: Option<u32>,
    #[serde(default)]
    pub tier: Option<String>,
    /// Fade percentage range.
    #[serde(default)]
    pub min_fade: Option<Decimal>,
    #[serde(default)]
    pub max_fade: Option<Decimal>,
    /// Applied patches.
    #[serde(default)]
    pub extra_tag_ids: Option<String>,
}

impl SellOrderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort_by = Some(sort);
        self
    }

    pub fn with_float_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_paintwear = min;
        self.max_paintwear = max;
        self
    }

    pub fn with_fade_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_fade = min;
        self.max_fade = max;
        self
    }

    pub fn with_paintseed(mut self, paintseed: u32) -> Self {
        self.paintseed = Some(paintseed);
        self
    }

    pub fn with_sticker(mut self, extra_tag_id: impl Into<String>) -> Self {
        self.extra_tag_id = Some(extra_tag_id.into());
        self
    }

    /// Whether no refinement is set.
    pub fn is_empty(&self) -> bool {
        self.to_params().is_empty()
    }

    /// Set refinements as `(name, value)` pairs in a stable order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                params.push((name, value));
            }
        };

        push("sort_by", self.sort_by.map(|s| s.as_param().to_string()));
        push("min_paintwear", self.min_paintwear.map(|d| d.to_string()));
        push("max_paintwear", self.max_paintwear.map(|d| d.to_string()));
        push("tags_id", self.tags_id.clone());
        push("name_tag", self.name_tag.clone());
        push("extra_tag_id", self.extra_tag_id.clone());
        push("paintseed_group", self.paintseed_group.clone());
        push("paintseed", self.paintseed.map(|p| p.to_string()));
        push("tier", self.tier.clone());
        push("min_fade", self.min_fade.map(|d| d.to_string()));
        push("max_fade", self.max_fade.map(|d| d.to_string()));
        push("extra_tag_ids", self.extra_tag_ids.clone());

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_query_has_no_params() {
        let query = SellOrderQuery::new();
        assert!(query.is_empty());
        assert!(query.to_params().is_empty());
    }

    #[test]
    fn test_only_set_params_emitted() {
        let query = SellOrderQuery::new()
            .with_sort(SortOrder::FloatAsc)
            .with_float_range(Some(dec!(0.00)), Some(dec!(0.07)))
            .with_paintseed(661);

        assert_eq!(
            query.to_params(),
            vec![
                ("sort_by", "paintwear.asc".to_string()),
                ("min_paintwear", "0.00".to_string()),
                ("max_paintwear", "0.07".to_string()),
                ("paintseed", "661".to_string()),
            ]
        );
    }

    #[test]
    fn test_half_open_range() {
        let query = SellOrderQuery::new().with_fade_range(Some(dec!(95)), None);
        assert_eq!(query.to_params(), vec![("min_fade", "95".to_string())]);
    }
}
