//! Market data feed for intraday candles

pub mod yahoo;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::CandleSeries;

pub use yahoo::YahooChartClient;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid feed endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("Feed API error: {0}")]
    Status(u16),

    #[error("Provider reported: {0}")]
    Provider(String),

    #[error("Malformed chart payload: {0}")]
    Payload(String),
}

/// Source of candle series for one symbol.
///
/// Implementations never fail outward: provider errors are logged and an
/// empty series is returned, which the caller treats as "no data this tick".
/// No internal retries.
#[async_trait]
pub trait CandleFeed: Send + Sync {
    async fn fetch(&self, symbol: &str, interval: &str, range: &str) -> CandleSeries;
}
