//! Candle data source for the stock chart.
//!
//! One cache entry per [`TimeFrame`]; a [`RevalidatePolicy`] decides which
//! triggers (mount, key change, focus, reconnect) issue a network request.
//! The request itself goes through a [`Fetcher`] so the browser transport can
//! be swapped for a scripted one in tests.

mod config;
mod error;
mod fetcher;
mod source;
mod wire;

pub use config::{FeedConfig, RevalidatePolicy, DEFAULT_BASE_URL, DEFAULT_EXCHANGE, DEFAULT_SYMBOL};
pub use error::FeedError;
pub use fetcher::Fetcher;
#[cfg(target_arch = "wasm32")]
pub use fetcher::GlooFetcher;
pub use source::{FetchState, StockDataSource, Trigger};
pub use wire::CandlesResponse;

pub use ts_core::TimeFrame;
