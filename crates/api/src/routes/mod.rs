pub(crate) mod fallback;
mod static_files;
mod status;
mod webhook;

pub use fallback::not_found;
pub use static_files::dashboard_router;
pub use status::status_router;
pub use webhook::{webhook_router, WebhookResponse};
