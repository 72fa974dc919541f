//! Retrieval adapters implementing [`StockSource`](crate::StockSource).
//!
//! | Adapter | Source | Notes |
//! |---------|--------|-------|
//! | [`HttpStockAdapter`] | `stock_api` | JSON over HTTP, retries and circuit breaker |
//! | [`FixtureStockAdapter`] | `fixture` | Deterministic offline data |

mod fixture;
mod http_api;

pub use fixture::FixtureStockAdapter;
pub use http_api::HttpStockAdapter;
