use serde::{Deserialize, Deserializer, Serialize};
use ts_core::Candle;

use crate::FeedError;

/// Body of `GET /candle/v3/{symbol}/{timeFrame}/{exchange}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandlesResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub candles: Vec<Candle>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Candle>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Candle>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CandlesResponse {
    pub fn from_json(body: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(body)?)
    }
}
