//! Yahoo Finance chart API client for intraday candles

use std::time::Duration;

use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::core::types::{Candle, CandleSeries};
use super::{CandleFeed, FeedError};

pub const YAHOO_CHART_API: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;

// Yahoo rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) ema-alert/0.1";

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(rename = "gmtoffset", default)]
    pub gmt_offset: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

/// Column-oriented OHLC arrays; the provider emits `null` for empty buckets.
#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

pub struct YahooChartClient {
    client: Client,
    api_base: String,
}

impl YahooChartClient {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str, interval: &str, range: &str) -> Result<Url, FeedError> {
        let mut url = Url::parse(&format!("{}/v8/finance/chart/", self.api_base))?;
        url.path_segments_mut()
            .map_err(|_| FeedError::Payload("chart API base cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("interval", interval)
            .append_pair("range", range);
        Ok(url)
    }

    async fn fetch_chart(&self, symbol: &str, interval: &str, range: &str) -> Result<CandleSeries, FeedError> {
        let url = self.chart_url(symbol, interval, range)?;
        debug!(url = %url, "Requesting chart");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let body: ChartResponse = response.json().await?;
        parse_chart(body, interval)
    }
}

#[async_trait]
impl CandleFeed for YahooChartClient {
    #[instrument(skip(self))]
    async fn fetch(&self, symbol: &str, interval: &str, range: &str) -> CandleSeries {
        match self.fetch_chart(symbol, interval, range).await {
            Ok(series) => {
                debug!(candles = series.len(), "Chart fetched");
                series
            }
            Err(e) => {
                warn!(error = %e, "Chart request failed");
                CandleSeries::empty()
            }
        }
    }
}

/// Bucket length for intraday interval codes such as `5m` or `1h`.
/// Daily and longer intervals have no intraday bucket.
fn interval_seconds(interval: &str) -> Option<i64> {
    let (count, unit_secs) = if let Some(count) = interval.strip_suffix('m') {
        (count, 60)
    } else if let Some(count) = interval.strip_suffix('h') {
        (count, 3_600)
    } else {
        return None;
    };
    match count.parse::<i64>() {
        Ok(count) if count > 0 => Some(count * unit_secs),
        _ => None,
    }
}

/// During market hours the provider may append a live quote stamped inside
/// the newest bucket. Folds it into that bucket so the last element stays
/// the forming candle.
fn merge_live_row(series: CandleSeries, bucket_secs: i64) -> CandleSeries {
    let mut candles = series.into_candles();
    let n = candles.len();
    if n < 2 || (candles[n - 1].timestamp - candles[n - 2].timestamp).num_seconds() >= bucket_secs {
        return CandleSeries::from_unordered(candles);
    }

    if let Some(live) = candles.pop() {
        if let Some(bucket) = candles.last_mut() {
            bucket.high = bucket.high.max(live.high);
            bucket.low = bucket.low.min(live.low);
            bucket.close = live.close;
            debug!(bucket = %bucket.timestamp, live = %live.timestamp, "Merged live row into its bucket");
        }
    }
    CandleSeries::from_unordered(candles)
}

/// Turns a chart payload into an ordered series, dropping rows with missing prices.
pub fn parse_chart(body: ChartResponse, interval: &str) -> Result<CandleSeries, FeedError> {
    if let Some(err) = body.chart.error {
        return Err(FeedError::Provider(format!("{}: {}", err.code, err.description)));
    }

    let result = body
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FeedError::Payload("chart result missing".to_string()))?;

    let offset = FixedOffset::east_opt(result.meta.gmt_offset)
        .ok_or_else(|| FeedError::Payload(format!("invalid gmtoffset {}", result.meta.gmt_offset)))?;

    // Outside market hours the provider omits timestamps entirely.
    let timestamps = match result.timestamp {
        Some(timestamps) => timestamps,
        None => return Ok(CandleSeries::empty()),
    };

    let quote = match result.indicators.quote.into_iter().next() {
        Some(quote) => quote,
        None => return Ok(CandleSeries::empty()),
    };

    let mut rows = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    for (i, ts) in timestamps.iter().enumerate() {
        let fields = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            offset.timestamp_opt(*ts, 0).single(),
        );

        match fields {
            (Some(open), Some(high), Some(low), Some(close), Some(timestamp)) => rows.push(Candle {
                timestamp,
                open,
                high,
                low,
                close,
            }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(symbol = %result.meta.symbol, skipped, "Dropped incomplete chart rows");
    }

    let series = CandleSeries::from_unordered(rows);
    Ok(match interval_seconds(interval) {
        Some(bucket_secs) => merge_live_row(series, bucket_secs),
        None => series,
    })
}
