//! Variant resolution seam.

use skinpilot_core::ItemVariant;

/// Maps a canonical item name to its sellable variants.
///
/// Implementations return variants in canonical order (see
/// [`skinpilot_core::sort_canonical`]); an unknown name yields an empty vec.
pub trait VariantResolver: Send + Sync {
    fn resolve(&self, canonical_name: &str) -> Vec<ItemVariant>;
}
