//! One alert attempt per completed candle

use tracing::{debug, info};

use crate::core::types::{AlertState, Decision};

/// Decides whether `decision` should be sent and marks the candle if so.
///
/// The mark is set on decision, before delivery is known, so a failed send is
/// never retried for that candle. Non-bullish decisions leave the state as is.
pub fn should_send(decision: &Decision, state: &mut AlertState) -> bool {
    if !decision.is_bullish {
        return false;
    }

    if state.last_alerted_timestamp == Some(decision.candle_timestamp) {
        info!(candle_time = %decision.candle_timestamp, "Already alerted for candle");
        return false;
    }

    debug!(
        previous = ?state.last_alerted_timestamp,
        candle_time = %decision.candle_timestamp,
        "Marking candle as alerted"
    );
    state.last_alerted_timestamp = Some(decision.candle_timestamp);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::fixtures::candle;

    fn decision(slot: i64, is_bullish: bool) -> Decision {
        let c = candle(slot, 115.0, 118.0);
        Decision {
            is_bullish,
            candle_timestamp: c.timestamp,
            low: c.low,
            close: c.close,
            ema_value: 110.0,
        }
    }

    #[test]
    fn test_first_bullish_decision_sends_once() {
        let mut state = AlertState::new();
        let d = decision(3, true);

        assert!(should_send(&d, &mut state));
        assert!(!should_send(&d, &mut state));
        assert!(!should_send(&d, &mut state));
        assert_eq!(state.last_alerted_timestamp, Some(d.candle_timestamp));
    }

    #[test]
    fn test_non_bullish_leaves_state_unseen() {
        let mut state = AlertState::new();
        let bearish = decision(3, false);

        assert!(!should_send(&bearish, &mut state));
        assert_eq!(state.last_alerted_timestamp, None);

        // Same candle turning bullish later is still eligible.
        assert!(should_send(&decision(3, true), &mut state));
    }

    #[test]
    fn test_new_candle_after_marked_one_sends() {
        let mut state = AlertState::new();
        assert!(should_send(&decision(3, true), &mut state));
        assert!(should_send(&decision(4, true), &mut state));
        assert_eq!(
            state.last_alerted_timestamp,
            Some(decision(4, true).candle_timestamp)
        );
    }
}
