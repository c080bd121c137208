pub mod dispatcher;
pub mod hooks;

pub use dispatcher::LogDispatcher;
pub use hooks::PlaceholderHooks;
