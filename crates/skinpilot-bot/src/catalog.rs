//! Item catalog backed by a JSON file.
//!
//! Each row is one variant:
//! `{"name", "raw_name", "buff_id", "wear", "is_stattrak", "is_souvenir"}`.
//! Lookups by canonical name ignore case and surrounding whitespace.

use crate::error::{AppError, AppResult};
use serde::Deserialize;
use skinpilot_core::{sort_canonical, ItemVariant, Wear};
use skinpilot_engine::VariantResolver;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Default number of suggestions for an unknown name.
pub const SUGGESTION_LIMIT: usize = 25;

#[derive(Debug, Deserialize)]
struct CatalogRow {
    name: String,
    raw_name: String,
    buff_id: u64,
    #[serde(default)]
    wear: Option<Wear>,
    #[serde(default)]
    is_stattrak: bool,
    #[serde(default)]
    is_souvenir: bool,
}

/// Canonical item name -> variants, in canonical order.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    items: HashMap<String, Vec<ItemVariant>>,
    /// Display names, sorted.
    names: Vec<String>,
    /// Suggested for an empty query.
    featured: Vec<String>,
}

impl ItemCatalog {
    pub fn from_variants(variants: impl IntoIterator<Item = ItemVariant>) -> Self {
        let mut items: HashMap<String, Vec<ItemVariant>> = HashMap::new();
        for variant in variants {
            items
                .entry(normalize(&variant.canonical_name))
                .or_default()
                .push(variant);
        }

        let mut names = Vec::with_capacity(items.len());
        for variants in items.values_mut() {
            sort_canonical(variants);
            if let Some(first) = variants.first() {
                names.push(first.canonical_name.clone());
            }
        }
        names.sort();

        Self {
            items,
            names,
            featured: Vec::new(),
        }
    }

    /// Set the names suggested for an empty query. Names not in the catalog
    /// are dropped.
    pub fn with_featured(mut self, names: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.featured = names
            .into_iter()
            .filter_map(|name| {
                let variants = self.items.get(&normalize(name.as_ref()))?;
                variants.first().map(|v| v.canonical_name.clone())
            })
            .collect();
        self
    }

    pub fn from_json(content: &str) -> AppResult<Self> {
        let rows: Vec<CatalogRow> = serde_json::from_str(content)?;
        Ok(Self::from_variants(rows.into_iter().map(|row| ItemVariant {
            canonical_name: row.name,
            raw_name: row.raw_name,
            marketplace_id: row.buff_id,
            wear: row.wear,
            is_stattrak: row.is_stattrak,
            is_souvenir: row.is_souvenir,
        })))
    }

    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Catalog(format!("Failed to read catalog {}: {e}", path.display()))
        })?;
        let catalog = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            items = catalog.len(),
            "Item catalog loaded"
        );
        Ok(catalog)
    }

    /// Number of canonical items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Names containing the characters of `query` in order, closest first.
    /// An empty query gives the featured names.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.featured.iter().take(limit).cloned().collect();
        }

        let mut matches: Vec<(usize, &String)> = self
            .names
            .iter()
            .filter_map(|name| match_span(&query, &name.to_lowercase()).map(|span| (span, name)))
            .collect();
        // Tighter spans first, then shorter names.
        matches.sort_by(|(a_span, a), (b_span, b)| {
            a_span
                .cmp(b_span)
                .then_with(|| a.len().cmp(&b.len()))
                .then_with(|| a.cmp(b))
        });

        matches
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.clone())
            .collect()
    }
}

impl VariantResolver for ItemCatalog {
    fn resolve(&self, canonical_name: &str) -> Vec<ItemVariant> {
        self.items
            .get(&normalize(canonical_name))
            .cloned()
            .unwrap_or_default()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Width of the shortest window of `candidate` holding `query` as a
/// subsequence when matched greedily from each start, or None.
fn match_span(query: &str, candidate: &str) -> Option<usize> {
    let query: Vec<char> = query.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    let mut best: Option<usize> = None;
    for start in 0..candidate.len() {
        if candidate[start] != query[0] {
            continue;
        }
        let mut matched = 0;
        for (offset, ch) in candidate[start..].iter().enumerate() {
            if *ch == query[matched] {
                matched += 1;
                if matched == query.len() {
                    let span = offset + 1;
                    best = Some(best.map_or(span, |b| b.min(span)));
                    break;
                }
            }
        }
        if matched < query.len() {
            // No later start can match either.
            break;
        }
    }
    best
}
