//! Alert deduplication and delivery

pub mod dedup;
pub mod notifier;

pub use dedup::should_send;
pub use notifier::{format_alert, Credentials, Notifier, NotifyError, TelegramNotifier};
