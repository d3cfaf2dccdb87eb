//! Alert bot settings, read once from the environment at startup

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::alert::notifier::{Credentials, DEFAULT_NOTIFY_TIMEOUT_SECS, DEFAULT_TELEGRAM_API};
use crate::feed::yahoo::{DEFAULT_FEED_TIMEOUT_SECS, YAHOO_CHART_API};

pub const DEFAULT_SYMBOL: &str = "^NSEI";
pub const DEFAULT_SYMBOL_NAME: &str = "Nifty 50";
pub const DEFAULT_INTERVAL: &str = "5m";
pub const DEFAULT_RANGE: &str = "1d";
pub const DEFAULT_EMA_PERIOD: usize = 5;
pub const DEFAULT_LOOKBACK_CANDLES: usize = 20;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("EMA_PERIOD must be greater than zero")]
    ZeroPeriod,

    #[error("LOOKBACK_CANDLES ({lookback}) must be at least EMA_PERIOD + 1 ({required})")]
    LookbackTooShort { lookback: usize, required: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketSettings {
    pub symbol: String,
    pub symbol_name: String,
    pub interval: String,
    pub range: String,
    pub feed_api_base: String,
    pub feed_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategySettings {
    pub ema_period: usize,
    pub lookback_candles: usize,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotifySettings {
    pub api_base: String,
    pub timeout_secs: u64,
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertConfig {
    pub market: MarketSettings,
    pub strategy: StrategySettings,
    pub notify: NotifySettings,
    /// Liveness server port; `None` leaves it disabled.
    pub health_port: Option<u16>,
}

impl AlertConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let string = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let market = MarketSettings {
            symbol: string("SYMBOL", DEFAULT_SYMBOL),
            symbol_name: string("SYMBOL_NAME", DEFAULT_SYMBOL_NAME),
            interval: string("INTERVAL", DEFAULT_INTERVAL),
            range: string("RANGE", DEFAULT_RANGE),
            feed_api_base: string("FEED_API_BASE", YAHOO_CHART_API),
            feed_timeout_secs: parse_or("FEED_TIMEOUT_SECS", get("FEED_TIMEOUT_SECS"), DEFAULT_FEED_TIMEOUT_SECS)?,
        };

        let strategy = StrategySettings {
            ema_period: parse_or("EMA_PERIOD", get("EMA_PERIOD"), DEFAULT_EMA_PERIOD)?,
            lookback_candles: parse_or("LOOKBACK_CANDLES", get("LOOKBACK_CANDLES"), DEFAULT_LOOKBACK_CANDLES)?,
            poll_interval_secs: parse_or("POLL_INTERVAL_SECS", get("POLL_INTERVAL_SECS"), DEFAULT_POLL_INTERVAL_SECS)?,
        };

        let notify = NotifySettings {
            api_base: string("TELEGRAM_API_BASE", DEFAULT_TELEGRAM_API),
            timeout_secs: parse_or("NOTIFY_TIMEOUT_SECS", get("NOTIFY_TIMEOUT_SECS"), DEFAULT_NOTIFY_TIMEOUT_SECS)?,
            credentials: Credentials::from_parts(get("BOT_TOKEN"), get("CHAT_ID")),
        };

        let health_port = match get("PORT") {
            Some(raw) => Some(parse_value("PORT", &raw)?),
            None => None,
        };

        let config = Self {
            market,
            strategy,
            notify,
            health_port,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let period = self.strategy.ema_period;
        if period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.strategy.lookback_candles < period + 1 {
            return Err(ConfigError::LookbackTooShort {
                lookback: self.strategy.lookback_candles,
                required: period + 1,
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.strategy.poll_interval_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.market.feed_timeout_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify.timeout_secs)
    }
}

fn parse_value<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
    })
}

fn parse_or<T: std::str::FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}
