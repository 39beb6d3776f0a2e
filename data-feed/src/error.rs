use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Decode(err.to_string())
    }
}
