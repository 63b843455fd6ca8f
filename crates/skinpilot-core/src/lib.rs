//! Core domain types for the SkinPilot price aggregation engine.
//!
//! This crate provides the types shared by every other crate:
//! - `ItemVariant`, `Wear`: concrete sellable forms of a canonical item
//! - `Price`: precision-safe money amount
//! - `PriceQuote`, `AggregationResult`: per-variant lookup outcomes
//! - `FilterState`, `Toggle`: facet toggle state machine

pub mod decimal;
pub mod error;
pub mod filter;
pub mod quote;
pub mod variant;

pub use decimal::Price;
pub use error::{CoreError, Result};
pub use filter::{FilterState, Toggle};
pub use quote::{
    AggregationResult, ErrorKind, MarketQuote, PriceQuote, QuoteFailure, QuoteStatus,
    NOT_AVAILABLE,
};
pub use variant::{sort_canonical, ItemVariant, VariantKind, Wear};
