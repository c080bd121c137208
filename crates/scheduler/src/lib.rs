pub mod jobs;
pub mod lifecycle;

pub use jobs::{next_midnight, run_hook, HookOutcome};
pub use lifecycle::{Scheduler, SchedulerSettings};
