//! Shared helpers for marketplace integration tests.

pub mod mock_market;
