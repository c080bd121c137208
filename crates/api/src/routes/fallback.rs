use axum::{http::StatusCode, Json};

use super::WebhookResponse;

pub(crate) fn endpoint_not_found() -> (StatusCode, Json<WebhookResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(WebhookResponse::failure("Endpoint not found")),
    )
}

pub async fn not_found() -> (StatusCode, Json<WebhookResponse>) {
    endpoint_not_found()
}
