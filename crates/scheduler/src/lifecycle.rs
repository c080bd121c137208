use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use common::{Clock, Config, JobId, MarketHooks, SchedulerState};
use policy::TradingWindow;

use crate::jobs::{self, JobContext};

/// Scheduler timing and gating parameters.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Period of the market evaluation job.
    pub interval: Duration,
    /// Upper bound on one hook invocation. Defaults to `interval`.
    pub hook_timeout: Duration,
    pub window: TradingWindow,
}

impl SchedulerSettings {
    /// Longest accepted evaluation period. Larger values are clamped.
    pub const MAX_INTERVAL: Duration =
        Duration::from_secs(Config::MAX_SCHEDULER_INTERVAL_SECONDS);

    pub fn new(interval: Duration, window: TradingWindow) -> Self {
        // tokio intervals panic on a zero period, and instant arithmetic on a huge one
        let interval = interval.clamp(Duration::from_millis(1), Self::MAX_INTERVAL);
        Self {
            interval,
            hook_timeout: interval,
            window,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            Duration::from_secs(cfg.scheduler_interval_seconds),
            TradingWindow::from_config(cfg),
        )
    }

    pub fn with_hook_timeout(mut self, timeout: Duration) -> Self {
        self.hook_timeout = timeout;
        self
    }
}

struct JobHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl JobHandle {
    /// Stop future firings. An in-flight firing runs to completion.
    fn cancel(self) {
        let _ = self.cancel.send(true);
        drop(self.task);
    }
}

#[derive(Default)]
struct Registry {
    state: SchedulerState,
    jobs: HashMap<JobId, JobHandle>,
}

/// Owns the market evaluation and daily reset jobs.
///
/// `start` and `stop` are serialized by one lock over the job registry, so
/// concurrent callers can neither double-register a job nor lose a stop.
/// Both are idempotent. Dropping the scheduler drops the cancel senders,
/// which ends both job tasks.
pub struct Scheduler {
    settings: SchedulerSettings,
    hooks: Arc<dyn MarketHooks>,
    clock: Arc<dyn Clock>,
    registry: Mutex<Registry>,
}

impl Scheduler {
    pub fn new(
        settings: SchedulerSettings,
        hooks: Arc<dyn MarketHooks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            interval_secs = settings.interval.as_secs_f64(),
            "Trading scheduler initialized"
        );
        Self {
            settings,
            hooks,
            clock,
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub async fn state(&self) -> SchedulerState {
        self.registry.lock().await.state
    }

    /// Ids of the currently registered jobs, sorted.
    pub async fn registered_jobs(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.registry.lock().await.jobs.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Register both jobs and move to `Running`. No-op when already running.
    pub async fn start(&self) {
        let mut registry = self.registry.lock().await;
        if registry.state == SchedulerState::Running {
            debug!("Trading scheduler already running");
            return;
        }

        self.register(&mut registry, JobId::MarketEvaluation);
        self.register(&mut registry, JobId::DailyReset);
        registry.state = SchedulerState::Running;
        info!("Trading scheduler started");
    }

    /// Cancel pending firings of both jobs and move to `Stopped`.
    /// No-op when already stopped.
    pub async fn stop(&self) {
        let mut registry = self.registry.lock().await;
        if registry.state == SchedulerState::Stopped {
            debug!("Trading scheduler already stopped");
            return;
        }

        for (id, handle) in registry.jobs.drain() {
            debug!(job = %id, "Cancelling job");
            handle.cancel();
        }
        registry.state = SchedulerState::Stopped;
        info!("Trading scheduler stopped");
    }

    /// Spawn the task for `id`, replacing any existing registration.
    fn register(&self, registry: &mut Registry, id: JobId) {
        let ctx = JobContext {
            interval: self.settings.interval,
            hook_timeout: self.settings.hook_timeout,
            window: self.settings.window.clone(),
            hooks: self.hooks.clone(),
            clock: self.clock.clone(),
        };
        let (cancel, cancel_rx) = watch::channel(false);
        let task = match id {
            JobId::MarketEvaluation => tokio::spawn(jobs::market_evaluation(ctx, cancel_rx)),
            JobId::DailyReset => tokio::spawn(jobs::daily_reset(ctx, cancel_rx)),
        };

        if let Some(previous) = registry.jobs.insert(id, JobHandle { cancel, task }) {
            debug!(job = %id, "Replacing existing job registration");
            previous.cancel();
        }
        debug!(job = %id, "Job registered");
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
