use futures_util::future::LocalBoxFuture;

use crate::{CandlesResponse, FeedError};

/// Transport used by [`crate::StockDataSource`]: one GET, decoded as a candle payload.
pub trait Fetcher {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<CandlesResponse, FeedError>>;
}

/// Browser fetch via `gloo-net`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooFetcher;

#[cfg(target_arch = "wasm32")]
impl Fetcher for GlooFetcher {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<CandlesResponse, FeedError>> {
        use futures_util::FutureExt;
        use gloo_net::http::Request;

        async move {
            let resp = Request::get(url)
                .send()
                .await
                .map_err(|e| FeedError::Network(e.to_string()))?;
            if !resp.ok() {
                return Err(FeedError::Status(resp.status()));
            }
            let body = resp
                .text()
                .await
                .map_err(|e| FeedError::Network(e.to_string()))?;
            CandlesResponse::from_json(&body)
        }
        .boxed_local()
    }
}
