//! Item variants.
//!
//! A canonical item (e.g. "AK-47 | Redline") is sold in several concrete
//! forms: one per wear condition, each optionally StatTrak or Souvenir.
//! Every form has its own upstream pricing record.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Wear condition, ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Wear {
    #[serde(rename = "Factory New")]
    FactoryNew,
    #[serde(rename = "Minimal Wear")]
    MinimalWear,
    #[serde(rename = "Field-Tested")]
    FieldTested,
    #[serde(rename = "Well-Worn")]
    WellWorn,
    #[serde(rename = "Battle-Scarred")]
    BattleScarred,
}

impl Wear {
    /// All wears in canonical (best first) order.
    pub const ALL: [Wear; 5] = [
        Wear::FactoryNew,
        Wear::MinimalWear,
        Wear::FieldTested,
        Wear::WellWorn,
        Wear::BattleScarred,
    ];

    /// Rank used for ordering (0 = Factory New).
    #[inline]
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Display label as used by the marketplace.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FactoryNew => "Factory New",
            Self::MinimalWear => "Minimal Wear",
            Self::FieldTested => "Field-Tested",
            Self::WellWorn => "Well-Worn",
            Self::BattleScarred => "Battle-Scarred",
        }
    }

    /// Short code, e.g. `FN`.
    pub fn short_code(&self) -> &'static str {
        match self {
            Self::FactoryNew => "FN",
            Self::MinimalWear => "MW",
            Self::FieldTested => "FT",
            Self::WellWorn => "WW",
            Self::BattleScarred => "BS",
        }
    }
}

impl fmt::Display for Wear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Wear {
    type Err = CoreError;

    /// Accepts the full label or the two-letter code, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Wear::ALL
            .into_iter()
            .find(|w| {
                w.label().eq_ignore_ascii_case(needle) || w.short_code().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| CoreError::UnknownWear(s.to_string()))
    }
}

/// Grouping of variants by StatTrak/Souvenir flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VariantKind {
    Plain,
    StatTrak,
    Souvenir,
}

/// One concrete sellable form of a canonical item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemVariant {
    /// Name the user searched for.
    pub canonical_name: String,
    /// Display name including wear and flags.
    pub raw_name: String,
    /// Upstream goods id. Unique per variant.
    pub marketplace_id: u64,
    /// Wear condition. None for items without wear (stickers, agents, ...).
    pub wear: Option<Wear>,
    pub is_stattrak: bool,
    pub is_souvenir: bool,
}

impl ItemVariant {
    /// Neither StatTrak nor Souvenir.
    #[inline]
    pub fn is_plain(&self) -> bool {
        !self.is_stattrak && !self.is_souvenir
    }

    pub fn kind(&self) -> VariantKind {
        if self.is_stattrak {
            VariantKind::StatTrak
        } else if self.is_souvenir {
            VariantKind::Souvenir
        } else {
            VariantKind::Plain
        }
    }

    /// Raw name with the trailing `(Wear)` suffix removed.
    pub fn base_name(&self) -> &str {
        match self.wear {
            Some(wear) => {
                let suffix = format!("({})", wear.label());
                self.raw_name
                    .trim_end()
                    .strip_suffix(suffix.as_str())
                    .map(str::trim_end)
                    .unwrap_or(&self.raw_name)
            }
            None => &self.raw_name,
        }
    }

    /// Canonical ordering: plain, StatTrak, Souvenir groups; ascending wear
    /// rank inside each group; wear-less variants last.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let wear_key = |v: &Self| v.wear.map_or(u8::MAX, |w| w.rank());
        self.kind()
            .cmp(&other.kind())
            .then_with(|| wear_key(self).cmp(&wear_key(other)))
            .then_with(|| self.marketplace_id.cmp(&other.marketplace_id))
    }
}

/// Sort variants into canonical display order.
pub fn sort_canonical(variants: &mut [ItemVariant]) {
    variants.sort_by(ItemVariant::canonical_cmp);
}
