use serde_json::Value;
use tracing::{info, warn};

use common::{OrderAction, TradeInstruction};

use crate::payload::{self, PayloadFault};

/// Result of validating one inbound signal.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted(TradeInstruction),
    Rejected { reason: String },
}

impl ValidationOutcome {
    fn rejected(reason: impl Into<String>) -> Self {
        ValidationOutcome::Rejected {
            reason: reason.into(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }

    /// Human-readable message returned to the signal sender.
    pub fn message(&self) -> String {
        match self {
            ValidationOutcome::Accepted(i) => {
                format!("Processed {} signal for {}", i.action, i.ticker)
            }
            ValidationOutcome::Rejected { reason } => reason.clone(),
        }
    }
}

/// Validates inbound webhook payloads against the configured passphrase.
///
/// Stateless once built, so a single instance is shared by every request.
/// Checks run in a fixed order and stop at the first failure:
/// passphrase, ticker, strategy, order action, order price.
#[derive(Debug, Clone, Default)]
pub struct SignalValidator {
    passphrase: String,
}

impl SignalValidator {
    /// An empty passphrase disables the passphrase check.
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    pub fn requires_passphrase(&self) -> bool {
        !self.passphrase.is_empty()
    }

    /// Validate a decoded payload. Never fails: malformed shapes come back
    /// as `Rejected` with the fault description.
    pub fn validate(&self, payload: &Value) -> ValidationOutcome {
        match self.check(payload) {
            Ok(outcome) => outcome,
            Err(fault) => {
                warn!(error = %fault, "Error processing webhook request");
                ValidationOutcome::rejected(format!("Error processing webhook request: {fault}"))
            }
        }
    }

    fn check(&self, payload: &Value) -> Result<ValidationOutcome, PayloadFault> {
        let payload = payload::as_object(payload)?;

        if self.requires_passphrase()
            && payload::passphrase(payload) != Some(self.passphrase.as_str())
        {
            warn!("Invalid passphrase in webhook request");
            return Ok(ValidationOutcome::rejected("Invalid passphrase"));
        }

        let Some(ticker) = payload::ticker(payload)? else {
            warn!("Missing ticker in webhook request");
            return Ok(ValidationOutcome::rejected("Missing ticker"));
        };

        let Some(strategy) = payload::strategy(payload)? else {
            warn!(%ticker, "Missing strategy in webhook request");
            return Ok(ValidationOutcome::rejected("Missing strategy information"));
        };

        let raw_action = payload::order_action(strategy)?;
        let Some(action) = OrderAction::from_normalized(&raw_action) else {
            warn!(%ticker, action = %raw_action, "Invalid order action");
            return Ok(ValidationOutcome::rejected(format!(
                "Invalid order action: {raw_action}"
            )));
        };

        let Some(price) = payload::order_price(strategy)? else {
            warn!(%ticker, "Missing order price in webhook request");
            return Ok(ValidationOutcome::rejected("Missing order price"));
        };

        info!(%ticker, %action, price, "Processing trade");
        Ok(ValidationOutcome::Accepted(TradeInstruction::new(
            ticker, action, price,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "passphrase": "x",
            "ticker": "BTCUSD",
            "strategy": { "order_action": "BUY", "order_price": 50000 },
        })
    }

    fn reason(outcome: ValidationOutcome) -> String {
        match outcome {
            ValidationOutcome::Rejected { reason } => reason,
            ValidationOutcome::Accepted(i) => panic!("expected rejection, got {i:?}"),
        }
    }

    #[test]
    fn accepts_well_formed_signal() {
        let outcome = SignalValidator::new("x").validate(&valid_payload());
        assert_eq!(outcome.message(), "Processed buy signal for BTCUSD");
        let ValidationOutcome::Accepted(instruction) = outcome else {
            panic!("expected acceptance");
        };
        assert_eq!(instruction.ticker, "BTCUSD");
        assert_eq!(instruction.action, OrderAction::Buy);
        assert_eq!(instruction.price, 50_000.0);
    }

    #[test]
    fn wrong_passphrase_is_rejected_first() {
        let mut payload = valid_payload();
        payload["passphrase"] = json!("nope");
        payload["ticker"] = json!("");
        assert_eq!(reason(SignalValidator::new("x").validate(&payload)), "Invalid passphrase");
    }

    #[test]
    fn missing_passphrase_field_is_rejected() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("passphrase");
        assert_eq!(reason(SignalValidator::new("x").validate(&payload)), "Invalid passphrase");
    }

    #[test]
    fn empty_passphrase_disables_check() {
        let v = SignalValidator::new("");
        assert!(!v.requires_passphrase());
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("passphrase");
        assert!(v.validate(&payload).is_accepted());
        payload["passphrase"] = json!(42);
        assert!(v.validate(&payload).is_accepted());
    }

    #[test]
    fn missing_ticker_wins_over_bad_action() {
        let payload = json!({
            "passphrase": "x",
            "strategy": { "order_action": "hold", "order_price": 1 },
        });
        assert_eq!(reason(SignalValidator::new("x").validate(&payload)), "Missing ticker");
    }

    #[test]
    fn empty_strategy_is_missing() {
        let v = SignalValidator::new("");
        for strategy in [json!({}), json!(null), json!("")] {
            let payload = json!({ "ticker": "BTCUSD", "strategy": strategy });
            assert_eq!(reason(v.validate(&payload)), "Missing strategy information");
        }
        assert_eq!(
            reason(v.validate(&json!({ "ticker": "BTCUSD" }))),
            "Missing strategy information"
        );
    }

    #[test]
    fn invalid_action_reports_normalized_value() {
        let payload = json!({
            "ticker": "BTCUSD",
            "strategy": { "order_action": "HOLD", "order_price": 1 },
        });
        assert_eq!(
            reason(SignalValidator::new("").validate(&payload)),
            "Invalid order action: hold"
        );

        let payload = json!({ "ticker": "BTCUSD", "strategy": { "order_price": 1 } });
        assert_eq!(
            reason(SignalValidator::new("").validate(&payload)),
            "Invalid order action: "
        );
    }

    #[test]
    fn zero_price_counts_as_missing() {
        let v = SignalValidator::new("");
        for price in [json!(0), json!(0.0), json!(null), json!("")] {
            let payload = json!({
                "ticker": "BTCUSD",
                "strategy": { "order_action": "sell", "order_price": price },
            });
            assert_eq!(reason(v.validate(&payload)), "Missing order price");
        }
    }

    #[test]
    fn malformed_shapes_become_rejections() {
        let v = SignalValidator::new("");
        assert_eq!(
            reason(v.validate(&json!(["not", "an", "object"]))),
            "Error processing webhook request: payload must be a JSON object, got array"
        );
        assert_eq!(
            reason(v.validate(&json!({ "ticker": "BTCUSD", "strategy": "buy" }))),
            "Error processing webhook request: strategy must be an object, got string"
        );
        assert_eq!(
            reason(v.validate(&json!({
                "ticker": "BTCUSD",
                "strategy": { "order_action": 1, "order_price": 1 },
            }))),
            "Error processing webhook request: order_action must be a string, got number"
        );
    }

    #[test]
    fn sell_signal_with_string_price() {
        let payload = json!({
            "ticker": "ETHUSD",
            "strategy": { "order_action": "Sell", "order_price": "3120.25" },
        });
        let outcome = SignalValidator::new("").validate(&payload);
        assert_eq!(outcome.message(), "Processed sell signal for ETHUSD");
    }
}
