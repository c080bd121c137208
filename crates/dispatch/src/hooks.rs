use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use common::{MarketHooks, Result};

/// Scheduler hooks with no evaluation strategy attached.
///
/// Counts evaluation ticks per day so the daily reset has state to clear.
/// Both jobs may run at once, hence the atomics.
#[derive(Debug, Default)]
pub struct PlaceholderHooks {
    ticks_today: AtomicU64,
    resets: AtomicU64,
}

impl PlaceholderHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks_today(&self) -> u64 {
        self.ticks_today.load(Ordering::Relaxed)
    }

    pub fn resets(&self) -> u64 {
        self.resets.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MarketHooks for PlaceholderHooks {
    async fn on_market_evaluation_tick(&self) -> Result<()> {
        let n = self.ticks_today.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(tick = n, "Market evaluation tick (no strategy attached)");
        Ok(())
    }

    async fn on_daily_reset(&self) -> Result<()> {
        let ticks = self.ticks_today.swap(0, Ordering::Relaxed);
        self.resets.fetch_add(1, Ordering::Relaxed);
        info!(ticks_yesterday = ticks, "Daily counters reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reset_clears_tick_counter() {
        let hooks = PlaceholderHooks::new();
        for _ in 0..3 {
            hooks.on_market_evaluation_tick().await.unwrap();
        }
        assert_eq!(hooks.ticks_today(), 3);

        hooks.on_daily_reset().await.unwrap();
        assert_eq!(hooks.ticks_today(), 0);
        assert_eq!(hooks.resets(), 1);
    }
}
