use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side requested by an inbound signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    Buy,
    Sell,
}

impl OrderAction {
    /// Parse an already lower-cased action string.
    pub fn from_normalized(value: &str) -> Option<Self> {
        match value {
            "buy" => Some(OrderAction::Buy),
            "sell" => Some(OrderAction::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderAction::Buy => write!(f, "buy"),
            OrderAction::Sell => write!(f, "sell"),
        }
    }
}

/// A signal that passed validation, ready for the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInstruction {
    /// Correlates log lines for one instruction across components.
    #[serde(skip)]
    pub id: String,
    pub ticker: String,
    pub action: OrderAction,
    pub price: f64,
    #[serde(skip)]
    pub received_at: DateTime<Utc>,
}

impl TradeInstruction {
    pub fn new(ticker: impl Into<String>, action: OrderAction, price: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ticker: ticker.into(),
            action,
            price,
            received_at: Utc::now(),
        }
    }
}

/// Stable identifiers for the scheduler's jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobId {
    MarketEvaluation,
    DailyReset,
}

impl JobId {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobId::MarketEvaluation => "market_evaluation",
            JobId::DailyReset => "daily_reset",
        }
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    #[default]
    Stopped,
    Running,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerState::Stopped => write!(f, "stopped"),
            SchedulerState::Running => write!(f, "running"),
        }
    }
}
