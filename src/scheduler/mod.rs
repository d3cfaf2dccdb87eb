//! Polling loop: fetch, evaluate, deduplicate, notify, sleep

use std::panic::AssertUnwindSafe;

use anyhow::{bail, Result};
use futures_util::FutureExt;
use tracing::{error, info, instrument, warn};

use crate::alert::{format_alert, should_send, Notifier};
use crate::algo::evaluator::{completed_candle_ema, evaluate, Evaluation};
use crate::config::AlertConfig;
use crate::core::types::AlertState;
use crate::feed::CandleFeed;

/// Which branch a tick took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    NoData,
    NotEnoughData,
    NoSignal,
    AlreadyAlerted,
    /// A send was attempted; `delivered` is false when the notifier failed.
    Alerted { delivered: bool },
}

pub struct Scheduler<F, N> {
    config: AlertConfig,
    feed: F,
    notifier: N,
    state: AlertState,
}

impl<F, N> Scheduler<F, N>
where
    F: CandleFeed,
    N: Notifier,
{
    pub fn new(config: AlertConfig, feed: F, notifier: N) -> Self {
        Self {
            config,
            feed,
            notifier,
            state: AlertState::new(),
        }
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    /// Runs forever. A failing or panicking tick is logged and the loop
    /// carries on after the usual sleep.
    pub async fn run(&mut self) {
        let poll_interval = self.config.poll_interval();

        info!(
            symbol = %self.config.market.symbol,
            interval = %self.config.market.interval,
            "🚀 Starting EMA{} Trading Alert Bot",
            self.config.strategy.ema_period
        );
        info!("Monitoring: {} on {} interval", self.config.market.symbol, self.config.market.interval);

        loop {
            match AssertUnwindSafe(self.tick()).catch_unwind().await {
                Ok(Ok(outcome)) => info!(outcome = ?outcome, "Tick complete"),
                Ok(Err(e)) => error!(error = %e, "Error during tick"),
                Err(_) => error!("Tick panicked; continuing"),
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    /// One pass over the freshly fetched window.
    #[instrument(skip(self), fields(symbol = %self.config.market.symbol))]
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let market = &self.config.market;
        let period = self.config.strategy.ema_period;

        info!("Fetching data at {}", chrono::Local::now());
        let series = self
            .feed
            .fetch(&market.symbol, &market.interval, &market.range)
            .await;

        if series.is_empty() {
            info!("No data received, retrying...");
            return Ok(TickOutcome::NoData);
        }

        let window = series.tail(self.config.strategy.lookback_candles);
        if window.len() < period + 1 {
            info!(candles = window.len(), required = period + 1, "Not enough data, waiting...");
            return Ok(TickOutcome::NotEnoughData);
        }

        let ema = completed_candle_ema(&window, period);
        let decision = match evaluate(&window, ema) {
            Evaluation::Decided(decision) => decision,
            Evaluation::NotEnoughData => {
                info!("Cannot calculate EMA, waiting...");
                return Ok(TickOutcome::NotEnoughData);
            }
        };

        if !decision.ema_value.is_finite() || !decision.low.is_finite() {
            bail!(
                "non-finite values at {}: low={}, ema={}",
                decision.candle_timestamp,
                decision.low,
                decision.ema_value
            );
        }

        if !decision.is_bullish {
            info!(
                "No bullish signal. Low={:.2}, EMA{}={:.2} at {}",
                decision.low, period, decision.ema_value, decision.candle_timestamp
            );
            return Ok(TickOutcome::NoSignal);
        }

        if !should_send(&decision, &mut self.state) {
            return Ok(TickOutcome::AlreadyAlerted);
        }

        let message = format_alert(&market.symbol_name, &market.interval, period, &decision);
        info!("{}", message);

        let delivered = match self.notifier.send(&message).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    candle_time = %decision.candle_timestamp,
                    error = %e,
                    "Alert not delivered; candle stays marked"
                );
                false
            }
        };

        Ok(TickOutcome::Alerted { delivered })
    }
}
