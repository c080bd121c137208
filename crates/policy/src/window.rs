use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use common::Config;

/// Why a configured `HH:MM` string could not be turned into a time of day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeOfDayError {
    #[error("expected HH:MM, got '{0}'")]
    Format(String),

    #[error("'{0}' is not a valid time of day")]
    OutOfRange(String),
}

/// Daily window during which automated actions are permitted.
///
/// `end_time` earlier than `start_time` denotes an overnight window that
/// wraps past midnight. Times are kept as configured; parsing happens in
/// [`TradingWindow::hours`] so a bad value can fail open at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingWindow {
    pub allow_weekend_trading: bool,
    pub start_time: String,
    pub end_time: String,
}

impl Default for TradingWindow {
    fn default() -> Self {
        Self {
            allow_weekend_trading: false,
            start_time: "00:00".to_string(),
            end_time: "23:59".to_string(),
        }
    }
}

impl TradingWindow {
    pub fn new(
        allow_weekend_trading: bool,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            allow_weekend_trading,
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.allow_weekend_trading,
            cfg.trading_hours_start.clone(),
            cfg.trading_hours_end.clone(),
        )
    }

    /// Parsed `(start, end)` times of day, seconds zeroed.
    pub fn hours(&self) -> Result<(NaiveTime, NaiveTime), TimeOfDayError> {
        Ok((
            parse_time_of_day(&self.start_time)?,
            parse_time_of_day(&self.end_time)?,
        ))
    }
}

/// Parse `H:M` / `HH:MM`. Each field may carry surrounding whitespace;
/// a seconds field or any third component is rejected.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, TimeOfDayError> {
    let mut parts = raw.split(':');
    let (Some(hour), Some(minute), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(TimeOfDayError::Format(raw.to_string()));
    };

    let hour: u32 = hour
        .trim()
        .parse()
        .map_err(|_| TimeOfDayError::Format(raw.to_string()))?;
    let minute: u32 = minute
        .trim()
        .parse()
        .map_err(|_| TimeOfDayError::Format(raw.to_string()))?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeOfDayError::OutOfRange(raw.to_string()))
}
