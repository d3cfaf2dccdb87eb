//! Candle and alert data model

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One OHLC bucket. Immutable once fetched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Candles ordered strictly ascending by timestamp.
///
/// The last element is the candle that is still forming; only
/// [`CandleSeries::last_completed`] is ever evaluated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Builds a series from unordered rows, sorting ascending and collapsing
    /// duplicate timestamps (the later row wins).
    pub fn from_unordered(mut rows: Vec<Candle>) -> Self {
        rows.sort_by_key(|c| c.timestamp);

        let mut candles: Vec<Candle> = Vec::with_capacity(rows.len());
        for candle in rows {
            match candles.last_mut() {
                Some(prev) if prev.timestamp == candle.timestamp => *prev = candle,
                _ => candles.push(candle),
            }
        }

        Self { candles }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn into_candles(self) -> Vec<Candle> {
        self.candles
    }

    /// Keeps only the most recent `window` candles.
    pub fn tail(&self, window: usize) -> Self {
        let start = self.candles.len().saturating_sub(window);
        Self {
            candles: self.candles[start..].to_vec(),
        }
    }

    /// The second-to-last candle, i.e. the newest one whose bucket has closed.
    pub fn last_completed(&self) -> Option<&Candle> {
        let n = self.candles.len();
        if n < 2 {
            return None;
        }
        self.candles.get(n - 2)
    }

    /// Closes up to and including the last completed candle.
    pub fn completed_closes(&self) -> Vec<f64> {
        let n = self.candles.len();
        if n < 2 {
            return Vec::new();
        }
        self.candles[..n - 1].iter().map(|c| c.close).collect()
    }
}

/// Outcome of evaluating the last completed candle against its EMA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub is_bullish: bool,
    pub candle_timestamp: DateTime<FixedOffset>,
    pub low: f64,
    pub close: f64,
    pub ema_value: f64,
}

/// Process-lifetime dedup state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertState {
    pub last_alerted_timestamp: Option<DateTime<FixedOffset>>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Five-minute candle number `slot`, counted from 09:15 IST on 2024-03-01.
    pub fn candle(slot: i64, low: f64, close: f64) -> Candle {
        let ist = FixedOffset::east_opt(19_800).unwrap();
        let timestamp = ist.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap()
            + chrono::Duration::minutes(5 * slot);
        Candle {
            timestamp,
            open: close,
            high: close.max(low),
            low,
            close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::candle;
    use super::*;

    #[test]
    fn test_series_sorted_and_deduplicated() {
        let rows = vec![
            candle(2, 1.0, 3.0),
            candle(0, 1.0, 1.0),
            candle(1, 1.0, 2.0),
            candle(1, 1.0, 2.5),
        ];
        let series = CandleSeries::from_unordered(rows);

        let closes: Vec<f64> = series.candles().iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![1.0, 2.5, 3.0]);
        assert!(series
            .candles()
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_last_completed_skips_forming_candle() {
        let series = CandleSeries::from_unordered(vec![
            candle(0, 1.0, 10.0),
            candle(1, 1.0, 11.0),
            candle(2, 1.0, 12.0),
        ]);
        assert_eq!(series.last_completed().unwrap().close, 11.0);
        assert_eq!(series.completed_closes(), vec![10.0, 11.0]);

        let single = CandleSeries::from_unordered(vec![candle(0, 1.0, 10.0)]);
        assert!(single.last_completed().is_none());
        assert!(single.completed_closes().is_empty());
    }

    #[test]
    fn test_tail_keeps_most_recent() {
        let rows = (0..30).map(|i| candle(i, 1.0, i as f64)).collect();
        let series = CandleSeries::from_unordered(rows).tail(20);
        assert_eq!(series.len(), 20);
        assert_eq!(series.candles()[0].close, 10.0);

        let short = CandleSeries::from_unordered(vec![candle(0, 1.0, 1.0)]).tail(20);
        assert_eq!(short.len(), 1);
    }
}
