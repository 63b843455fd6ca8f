//! Price aggregation engine for SkinPilot.
//!
//! - `FanOutAggregator`: prices every variant of an item concurrently
//! - `visible_quotes`: facet filtering with fallback to the plain view
//! - `ViewSession` / `SessionRegistry`: per-user filter state with expiry
//! - `QuoteSource` / `VariantResolver`: seams to the marketplace and catalog

pub mod aggregator;
pub mod error;
pub mod filter;
pub mod resolver;
pub mod session;
pub mod source;

pub use aggregator::FanOutAggregator;
pub use error::{EngineError, EngineResult};
pub use filter::{derive_view, visible_quotes, FacetAvailability, FilteredView};
pub use resolver::VariantResolver;
pub use session::{SessionId, SessionRegistry, ViewSession, ViewSnapshot};
pub use source::{BoxFuture, DynQuoteSource, MockQuoteSource, MockResponse, QuoteSource};
