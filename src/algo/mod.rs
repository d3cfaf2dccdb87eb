//! Indicator math and the breakout rule

pub mod ema;
pub mod evaluator;

pub use ema::{calculate_ema, ema_series};
pub use evaluator::{completed_candle_ema, evaluate, Evaluation};
