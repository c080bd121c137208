use chrono::{Datelike, NaiveDateTime, Weekday};
use tracing::{debug, warn};

use crate::window::TradingWindow;

/// Outcome of a trading-hours check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Saturday or Sunday with weekend trading disabled.
    Weekend,
    OutsideHours,
    /// Trading hours did not parse. Counts as allowed.
    Misconfigured(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed | Decision::Misconfigured(_))
    }
}

/// Decide whether automated trading is permitted at `now` (local wall-clock).
///
/// The window bounds are `now`'s date combined with the configured times,
/// seconds zeroed. For an overnight window only the gap strictly between
/// end and start is closed, so both boundary instants stay open.
pub fn evaluate(now: NaiveDateTime, window: &TradingWindow) -> Decision {
    let is_weekend = matches!(now.weekday(), Weekday::Sat | Weekday::Sun);
    if is_weekend && !window.allow_weekend_trading {
        return Decision::Weekend;
    }

    let (start, end) = match window.hours() {
        Ok(hours) => hours,
        Err(e) => return Decision::Misconfigured(e.to_string()),
    };

    let window_start = now.date().and_time(start);
    let window_end = now.date().and_time(end);

    let closed = if window_end < window_start {
        now < window_start && now > window_end
    } else {
        now < window_start || now > window_end
    };

    if closed {
        Decision::OutsideHours
    } else {
        Decision::Allowed
    }
}

/// [`evaluate`] reduced to a yes/no, logging why a tick is skipped.
pub fn is_trading_allowed(now: NaiveDateTime, window: &TradingWindow) -> bool {
    let decision = evaluate(now, window);
    match &decision {
        Decision::Allowed => {}
        Decision::Weekend => debug!("Trading not allowed on weekends"),
        Decision::OutsideHours => debug!(%now, "Outside of trading hours"),
        Decision::Misconfigured(reason) => {
            warn!(%reason, "Invalid trading hours format in settings, allowing trading")
        }
    }
    decision.is_allowed()
}
