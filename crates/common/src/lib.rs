pub mod config;
pub mod error;
pub mod hooks;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use hooks::{Clock, MarketHooks, SystemClock, TradeDispatcher};
pub use types::*;
