//! Coercions from the untyped webhook payload into typed fields.
//!
//! Each helper either yields a typed value, `None` for a falsy field
//! (absent, `null`, `false`, `0`, `""`, `[]`, `{}`), or a [`PayloadFault`]
//! when the field is present but has a shape nothing downstream can use.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadFault {
    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("ticker must be a string or number, got {0}")]
    Ticker(&'static str),

    #[error("strategy must be an object, got {0}")]
    Strategy(&'static str),

    #[error("order_action must be a string, got {0}")]
    OrderAction(&'static str),

    #[error("order_price must be numeric, got {0}")]
    OrderPrice(String),

    #[error("could not convert form order_price to float: '{0}'")]
    FormPrice(String),
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Truthiness the way loosely-typed webhook senders expect it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn truthy_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| is_truthy(v))
}

pub(crate) fn as_object(payload: &Value) -> Result<&Map<String, Value>, PayloadFault> {
    payload
        .as_object()
        .ok_or_else(|| PayloadFault::NotAnObject(kind(payload)))
}

pub(crate) fn passphrase(payload: &Map<String, Value>) -> Option<&str> {
    payload.get("passphrase").and_then(Value::as_str)
}

/// Numeric tickers are rendered to their JSON text.
pub(crate) fn ticker(payload: &Map<String, Value>) -> Result<Option<String>, PayloadFault> {
    match truthy_field(payload, "ticker") {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(PayloadFault::Ticker(kind(other))),
    }
}

pub(crate) fn strategy(
    payload: &Map<String, Value>,
) -> Result<Option<&Map<String, Value>>, PayloadFault> {
    match truthy_field(payload, "strategy") {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(PayloadFault::Strategy(kind(other))),
    }
}

/// Lower-cased `order_action`; an absent field reads as the empty string.
pub(crate) fn order_action(strategy: &Map<String, Value>) -> Result<String, PayloadFault> {
    match strategy.get("order_action") {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.to_lowercase()),
        Some(other) => Err(PayloadFault::OrderAction(kind(other))),
    }
}

/// `order_price` as a number; `None` when falsy or numerically zero.
pub(crate) fn order_price(strategy: &Map<String, Value>) -> Result<Option<f64>, PayloadFault> {
    let price = match truthy_field(strategy, "order_price") {
        None => return Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| PayloadFault::OrderPrice(n.to_string()))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| PayloadFault::OrderPrice(format!("'{s}'")))?,
        Some(other) => return Err(PayloadFault::OrderPrice(kind(other).to_string())),
    };
    Ok((price != 0.0).then_some(price))
}

/// Rebuild the nested payload shape from flat form fields.
///
/// A missing `order_price` reads as `0`; a present but non-numeric one is a
/// transport fault.
pub fn form_payload<I, K, V>(fields: I) -> Result<Value, PayloadFault>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut passphrase = String::new();
    let mut ticker = String::new();
    let mut order_action = String::new();
    let mut order_price: Option<String> = None;

    for (key, value) in fields {
        let slot = match key.as_ref() {
            "passphrase" => &mut passphrase,
            "ticker" => &mut ticker,
            "order_action" => &mut order_action,
            "order_price" => order_price.get_or_insert_with(String::new),
            _ => continue,
        };
        // first non-empty occurrence wins
        if slot.is_empty() {
            *slot = value.into();
        }
    }

    let price = match order_price {
        None => 0.0,
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| PayloadFault::FormPrice(raw.clone()))?,
    };

    Ok(serde_json::json!({
        "passphrase": passphrase,
        "ticker": ticker,
        "strategy": {
            "order_action": order_action,
            "order_price": price,
        },
    }))
}
