pub mod payload;
pub mod validator;

pub use payload::{form_payload, PayloadFault};
pub use validator::{SignalValidator, ValidationOutcome};
