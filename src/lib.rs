// Data model
pub mod core;

// Candle feed, indicator math and alerting
pub mod feed;
pub mod algo;
pub mod alert;

// Runtime plumbing
pub mod config;
pub mod scheduler;
pub mod util;

pub use crate::core::types::{AlertState, Candle, CandleSeries, Decision};
pub use scheduler::{Scheduler, TickOutcome};
