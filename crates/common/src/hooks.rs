use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};

use crate::{Result, TradeInstruction};

/// Downstream consumer of accepted signals.
///
/// Reached from both the webhook path and the scheduler path, so
/// implementations must tolerate concurrent calls. No ordering is
/// guaranteed between the two paths.
#[async_trait]
pub trait TradeDispatcher: Send + Sync {
    /// Hand over a validated instruction.
    async fn dispatch(&self, instruction: &TradeInstruction) -> Result<()>;
}

/// Callbacks fired by the scheduler.
///
/// Errors returned here are logged by the scheduler and never stop a job.
#[async_trait]
pub trait MarketHooks: Send + Sync {
    /// Called on every periodic tick that the trading-hours policy permits.
    async fn on_market_evaluation_tick(&self) -> Result<()>;

    /// Called once per calendar day at local midnight.
    async fn on_daily_reset(&self) -> Result<()>;
}

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// `Clock` backed by the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
