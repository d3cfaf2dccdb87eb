//! Breakout check on the last completed candle

use tracing::debug;

use crate::core::types::{CandleSeries, Decision};
use super::ema::calculate_ema;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// Fewer than two candles, or EMA undefined.
    NotEnoughData,
    Decided(Decision),
}

/// Applies the breakout rule: the whole candle, low included, must sit above the EMA.
///
/// Only the second-to-last candle is inspected; the last one is still forming.
pub fn evaluate(series: &CandleSeries, ema_value: Option<f64>) -> Evaluation {
    let (candle, ema_value) = match (series.last_completed(), ema_value) {
        (Some(candle), Some(ema)) => (candle, ema),
        _ => return Evaluation::NotEnoughData,
    };

    let decision = Decision {
        is_bullish: candle.low > ema_value,
        candle_timestamp: candle.timestamp,
        low: candle.low,
        close: candle.close,
        ema_value,
    };

    debug!(
        candle_time = %decision.candle_timestamp,
        low = decision.low,
        ema = decision.ema_value,
        bullish = decision.is_bullish,
        "Evaluated last completed candle"
    );

    Evaluation::Decided(decision)
}

/// EMA at the last completed candle, computed from scratch over the window.
pub fn completed_candle_ema(series: &CandleSeries, period: usize) -> Option<f64> {
    calculate_ema(&series.completed_closes(), period)
}
