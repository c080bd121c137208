use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use common::{Result, TradeDispatcher, TradeInstruction};

/// Dispatcher that records instructions instead of routing them to a broker.
///
/// No order ever leaves the process. Safe to share between the webhook
/// handlers; the only state is a counter.
#[derive(Debug, Default)]
pub struct LogDispatcher {
    dispatched: AtomicU64,
}

impl LogDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total instructions dispatched since startup.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TradeDispatcher for LogDispatcher {
    async fn dispatch(&self, instruction: &TradeInstruction) -> Result<()> {
        let n = self.dispatched.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            id = %instruction.id,
            ticker = %instruction.ticker,
            action = %instruction.action,
            price = instruction.price,
            total = n,
            "Trade instruction dispatched (no broker attached)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use common::OrderAction;

    #[tokio::test]
    async fn counts_dispatched_instructions() {
        let dispatcher = LogDispatcher::new();
        for price in [1.0, 2.0, 3.0] {
            let instruction = TradeInstruction::new("ETHUSD", OrderAction::Sell, price);
            dispatcher.dispatch(&instruction).await.unwrap();
        }
        assert_eq!(dispatcher.dispatched(), 3);
    }

    #[tokio::test]
    async fn concurrent_dispatches_are_all_counted() {
        let dispatcher = Arc::new(LogDispatcher::new());
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let price = i as f64 + 1.0;
                    let instruction = TradeInstruction::new("SOLUSD", OrderAction::Buy, price);
                    dispatcher.dispatch(&instruction).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(dispatcher.dispatched(), 32);
    }
}
