//! SkinPilot price checker.
//!
//! Looks up every variant of a CS item on the marketplace at once and shows
//! the prices as a filterable table:
//! - Item catalog (variant resolution)
//! - Fan-out price aggregation
//! - Facet toggles over an interactive view

pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod render;

pub use app::{initial_state, Application, ViewCommand};
pub use catalog::ItemCatalog;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use render::TableRenderer;
