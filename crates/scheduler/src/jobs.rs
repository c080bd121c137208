use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use common::{Clock, JobId, MarketHooks, Result};
use policy::TradingWindow;

/// Everything a job task needs, cloned out of the scheduler at registration.
#[derive(Clone)]
pub(crate) struct JobContext {
    pub interval: Duration,
    pub hook_timeout: Duration,
    pub window: TradingWindow,
    pub hooks: Arc<dyn MarketHooks>,
    pub clock: Arc<dyn Clock>,
}

/// How one hook invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Completed,
    Failed(String),
    Panicked,
    TimedOut,
}

/// Run one hook invocation in its own task, bounded by `timeout`.
///
/// Errors, panics and overruns are logged and reported, never propagated.
/// A task that overruns is aborted.
pub async fn run_hook<F>(job: JobId, timeout: Duration, hook: F) -> HookOutcome
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    let mut task = tokio::spawn(hook);
    match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(Ok(()))) => HookOutcome::Completed,
        Ok(Ok(Err(e))) => {
            error!(%job, error = %e, "Scheduled hook failed");
            HookOutcome::Failed(e.to_string())
        }
        Ok(Err(e)) if e.is_panic() => {
            error!(%job, "Scheduled hook panicked");
            HookOutcome::Panicked
        }
        Ok(Err(e)) => {
            error!(%job, error = %e, "Scheduled hook task was cancelled");
            HookOutcome::Failed(e.to_string())
        }
        Err(_) => {
            task.abort();
            warn!(%job, timeout_ms = timeout.as_millis() as u64, "Scheduled hook timed out");
            HookOutcome::TimedOut
        }
    }
}

/// Consecutive unsuccessful hook runs for one job.
#[derive(Debug, Default)]
pub(crate) struct FailureStreak(u32);

impl FailureStreak {
    pub(crate) fn record(&mut self, job: JobId, outcome: &HookOutcome) -> u32 {
        if *outcome == HookOutcome::Completed {
            if self.0 > 0 {
                info!(%job, failed_runs = self.0, "Scheduled hook recovered");
            }
            self.0 = 0;
        } else {
            self.0 += 1;
            warn!(%job, consecutive = self.0, ?outcome, "Scheduled hook did not complete");
        }
        self.0
    }
}

/// First local midnight strictly after `from`.
pub fn next_midnight(from: NaiveDateTime) -> NaiveDateTime {
    from.date()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Job A: fire every `interval`, gated by the trading-hours policy.
/// The first tick lands one full interval after registration.
pub(crate) async fn market_evaluation(ctx: JobContext, mut cancel: watch::Receiver<bool>) {
    let job = JobId::MarketEvaluation;
    let mut failures = FailureStreak::default();
    let mut ticker = tokio::time::interval_at(Instant::now() + ctx.interval, ctx.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.changed() => break,
            _ = ticker.tick() => {}
        }

        let now = ctx.clock.now();
        if !policy::is_trading_allowed(now, &ctx.window) {
            continue;
        }

        debug!(%job, %now, "Evaluating market conditions");
        let hooks = ctx.hooks.clone();
        let outcome = run_hook(job, ctx.hook_timeout, async move {
            hooks.on_market_evaluation_tick().await
        })
        .await;
        failures.record(job, &outcome);
    }
    debug!(%job, "Job cancelled");
}

/// Job B: fire once per calendar day at local midnight.
pub(crate) async fn daily_reset(ctx: JobContext, mut cancel: watch::Receiver<bool>) {
    let job = JobId::DailyReset;
    // Midnight already handled, so an early wake-up never fires the same day twice.
    let mut fired_through: Option<NaiveDateTime> = None;
    let mut failures = FailureStreak::default();

    loop {
        let now = ctx.clock.now();
        let from = fired_through.map_or(now, |t| t.max(now));
        let target = next_midnight(from);
        let wait = (target - now).to_std().unwrap_or_default();
        debug!(%job, %target, wait_secs = wait.as_secs(), "Next daily reset scheduled");

        tokio::select! {
            biased;
            _ = cancel.changed() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        // The sleep is monotonic; the wall clock may have been set back meanwhile.
        let woke = ctx.clock.now();
        if woke < target {
            debug!(%job, %woke, %target, "Woke before local midnight, waiting again");
            continue;
        }

        fired_through = Some(target);
        info!(%job, "Performing daily reset");
        let hooks = ctx.hooks.clone();
        let outcome =
            run_hook(job, ctx.hook_timeout, async move { hooks.on_daily_reset().await }).await;
        failures.record(job, &outcome);
    }
    debug!(%job, "Job cancelled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::Error;

    fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn next_midnight_rolls_to_following_day() {
        assert_eq!(next_midnight(at(4, 23, 59, 50)), at(5, 0, 0, 0));
        assert_eq!(next_midnight(at(4, 0, 0, 0)), at(5, 0, 0, 0));
        let april_first = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert_eq!(next_midnight(at(31, 12, 0, 0)), april_first.and_hms_opt(0, 0, 0).unwrap());
    }

    async fn succeed() -> Result<()> {
        Ok(())
    }

    async fn fail() -> Result<()> {
        Err(Error::Hook("broker offline".into()))
    }

    async fn explode() -> Result<()> {
        panic!("evaluation blew up")
    }

    async fn hang() -> Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    #[test]
    fn failure_streak_resets_on_success() {
        let mut streak = FailureStreak::default();
        let job = JobId::MarketEvaluation;
        assert_eq!(streak.record(job, &HookOutcome::TimedOut), 1);
        assert_eq!(streak.record(job, &HookOutcome::Failed("down".into())), 2);
        assert_eq!(streak.record(job, &HookOutcome::Completed), 0);
        assert_eq!(streak.record(job, &HookOutcome::Panicked), 1);
    }

    #[tokio::test]
    async fn completed_hook_reports_completion() {
        let outcome = run_hook(JobId::DailyReset, Duration::from_secs(1), succeed()).await;
        assert_eq!(outcome, HookOutcome::Completed);
    }

    #[tokio::test]
    async fn failing_hook_is_contained() {
        let outcome = run_hook(JobId::MarketEvaluation, Duration::from_secs(1), fail()).await;
        assert_eq!(outcome, HookOutcome::Failed("Hook error: broker offline".into()));
    }

    #[tokio::test]
    async fn panicking_hook_is_contained() {
        let outcome = run_hook(JobId::MarketEvaluation, Duration::from_secs(1), explode()).await;
        assert_eq!(outcome, HookOutcome::Panicked);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_hook_times_out() {
        let outcome = run_hook(JobId::MarketEvaluation, Duration::from_secs(5), hang()).await;
        assert_eq!(outcome, HookOutcome::TimedOut);
    }
}
