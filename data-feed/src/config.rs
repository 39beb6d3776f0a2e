use serde::{Deserialize, Serialize};
use ts_core::TimeFrame;

pub const DEFAULT_BASE_URL: &str = "https://chart.stockscan.io";
pub const DEFAULT_SYMBOL: &str = "TSLA";
pub const DEFAULT_EXCHANGE: &str = "NASDAQ";

/// Which events cause a cached key to be fetched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevalidatePolicy {
    pub revalidate_on_focus: bool,
    pub revalidate_on_reconnect: bool,
    pub revalidate_on_mount: bool,
    pub revalidate_if_stale: bool,
}

impl Default for RevalidatePolicy {
    fn default() -> Self {
        Self {
            revalidate_on_focus: false,
            revalidate_on_reconnect: false,
            revalidate_on_mount: true,
            revalidate_if_stale: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub base_url: String,
    pub symbol: String,
    pub exchange: String,
    pub revalidate: RevalidatePolicy,
}

impl FeedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_revalidate(mut self, revalidate: RevalidatePolicy) -> Self {
        self.revalidate = revalidate;
        self
    }

    /// `{base}/candle/v3/{symbol}/{timeFrame}/{exchange}`
    pub fn url_for(&self, timeframe: TimeFrame) -> String {
        format!(
            "{}/candle/v3/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.symbol,
            timeframe.as_str(),
            self.exchange
        )
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            exchange: DEFAULT_EXCHANGE.to_string(),
            revalidate: RevalidatePolicy::default(),
        }
    }
}
