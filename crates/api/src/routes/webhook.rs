use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use common::{Error, TradeInstruction};
use signal::{form_payload, ValidationOutcome};

use crate::AppState;

pub fn webhook_router(path: &str) -> Router<AppState> {
    Router::new().route(path, post(handle_webhook))
}

/// Body returned to the signal sender.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TradeInstruction>,
}

impl WebhookResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Validation rejections and malformed bodies are answered with 200 and
/// `success: false`; only a dispatcher failure surfaces as a 500.
async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = match decode_body(&headers, &body) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, "Error handling webhook request");
            return Json(WebhookResponse::failure(format!(
                "Error handling webhook request: {e}"
            )))
            .into_response();
        }
    };

    let ticker = payload.get("ticker").cloned().unwrap_or_default();
    info!(%ticker, "Received webhook");

    let outcome = state.validator.validate(&payload);
    let message = outcome.message();
    let instruction = match outcome {
        ValidationOutcome::Accepted(instruction) => instruction,
        ValidationOutcome::Rejected { .. } => {
            return Json(WebhookResponse::failure(message)).into_response();
        }
    };

    if let Err(e) = state.dispatcher.dispatch(&instruction).await {
        error!(id = %instruction.id, error = %e, "Trade dispatch failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(WebhookResponse::failure("Internal server error")),
        )
            .into_response();
    }

    Json(WebhookResponse {
        success: true,
        message,
        data: Some(instruction),
    })
    .into_response()
}

/// Decode a webhook body into the untyped payload.
///
/// JSON is tried first. A body declared as JSON that fails to parse is a
/// transport fault; anything else falls back to form fields.
fn decode_body(headers: &HeaderMap, body: &[u8]) -> Result<Value, Error> {
    let declared_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            let ct = ct.to_ascii_lowercase();
            ct.starts_with("application/json") || ct.contains("+json")
        });

    match serde_json::from_slice::<Value>(body) {
        Ok(payload) => Ok(payload),
        Err(e) if declared_json => Err(Error::Json(e)),
        Err(_) => form_payload(url::form_urlencoded::parse(body))
            .map_err(|e| Error::Transport(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers(content_type: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        h
    }

    #[test]
    fn json_body_decodes_without_content_type() {
        let payload = decode_body(&HeaderMap::new(), br#"{"ticker":"BTCUSD"}"#).unwrap();
        assert_eq!(payload, json!({ "ticker": "BTCUSD" }));
    }

    #[test]
    fn declared_json_must_parse() {
        let err = decode_body(&headers("application/json"), b"{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn form_body_falls_back_to_fields() {
        let payload = decode_body(
            &headers("application/x-www-form-urlencoded"),
            b"ticker=BTC%2FUSD&order_action=buy&order_price=42.5",
        )
        .unwrap();
        assert_eq!(payload["ticker"], json!("BTC/USD"));
        assert_eq!(payload["strategy"]["order_price"], json!(42.5));
        assert_eq!(payload["passphrase"], json!(""));
    }

    #[test]
    fn bad_form_price_is_transport_fault() {
        let err = decode_body(&headers("text/plain"), b"order_price=lots").unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
