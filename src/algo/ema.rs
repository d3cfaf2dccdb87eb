//! Exponential moving average over close prices

/// Smoothing factor for the recurrence: k = 2 / (period + 1)
fn smoothing(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// EMA aligned to the last price in `prices`.
///
/// Seeded with the simple mean of the first `period` prices, then
/// `ema = price * k + ema * (1 - k)` for every later price.
/// Returns `None` when `period == 0` or fewer than `period` prices are given.
pub fn calculate_ema(prices: &[f64], period: usize) -> Option<f64> {
    ema_series(prices, period).last().copied()
}

/// Full EMA series. Element `i` is aligned to `prices[period - 1 + i]`;
/// indices before the seed window have no defined value.
pub fn ema_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let k = smoothing(period);
    let seed = prices[..period].iter().sum::<f64>() / period as f64;

    let mut series = Vec::with_capacity(prices.len() - period + 1);
    series.push(seed);

    let mut ema = seed;
    for price in &prices[period..] {
        ema = price * k + ema * (1.0 - k);
        series.push(ema);
    }

    series
}
