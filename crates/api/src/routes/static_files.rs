use axum::{
    body::Body,
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::RustEmbed;

use crate::AppState;

/// Operator dashboard, embedded from `dashboard/` at compile time.
#[derive(RustEmbed)]
#[folder = "dashboard/"]
struct DashboardAssets;

pub fn dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/assets/*path", get(asset))
}

async fn index() -> Response {
    serve_embedded("index.html")
}

async fn asset(Path(path): Path<String>) -> Response {
    serve_embedded(&path)
}

fn serve_embedded(path: &str) -> Response {
    match DashboardAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                Body::from(content.data.into_owned()),
            )
                .into_response()
        }
        None => super::fallback::endpoint_not_found().into_response(),
    }
}
