//! Outbound text alerts via the Telegram Bot API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use crate::core::types::Decision;

pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("BOT_TOKEN or CHAT_ID not set in environment variables")]
    Misconfigured,

    #[error("Invalid messaging endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Status code: {0}")]
    Status(u16),
}

/// Sends a formatted alert. One attempt per call, no retries.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub chat_id: String,
}

impl Credentials {
    /// Both values must be present and non-blank.
    pub fn from_parts(token: Option<String>, chat_id: Option<String>) -> Option<Self> {
        let token = token.filter(|t| !t.trim().is_empty())?;
        let chat_id = chat_id.filter(|c| !c.trim().is_empty())?;
        Some(Self { token, chat_id })
    }
}

pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    credentials: Option<Credentials>,
}

impl TelegramNotifier {
    pub fn new(
        api_base: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn send_message_url(&self, credentials: &Credentials, message: &str) -> Result<Url, NotifyError> {
        let mut url = Url::parse(&format!("{}/bot{}/sendMessage", self.api_base, credentials.token))?;
        url.query_pairs_mut()
            .append_pair("chat_id", &credentials.chat_id)
            .append_pair("text", message);
        Ok(url)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip(self, message))]
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let credentials = match &self.credentials {
            Some(credentials) => credentials,
            None => {
                warn!("BOT_TOKEN or CHAT_ID not set in environment variables");
                return Err(NotifyError::Misconfigured);
            }
        };

        let url = self.send_message_url(credentials, message)?;

        // The request URL embeds the bot token; keep it out of error text.
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let e = e.without_url();
                warn!(error = %e, "Failed to send alert");
                return Err(NotifyError::Transport(e));
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            info!("Alert sent successfully");
            Ok(())
        } else {
            warn!(status = status.as_u16(), "Failed to send alert. Status code: {}", status.as_u16());
            Err(NotifyError::Status(status.as_u16()))
        }
    }
}

/// Alert text. Downstream consumers match on this layout.
pub fn format_alert(symbol_name: &str, interval: &str, period: usize, decision: &Decision) -> String {
    format!(
        "✅ Bullish Alert: {} ({}) closed fully ABOVE {}-EMA at {}\nClose={:.2}, EMA5={:.2}",
        symbol_name,
        interval,
        period,
        decision.candle_timestamp.format("%Y-%m-%d %H:%M:%S%:z"),
        decision.close,
        decision.ema_value,
    )
}
