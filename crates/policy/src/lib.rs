pub mod gate;
pub mod window;

pub use gate::{evaluate, is_trading_allowed, Decision};
pub use window::{parse_time_of_day, TimeOfDayError, TradingWindow};
