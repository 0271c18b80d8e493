use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use rust_embed::RustEmbed;

use crate::AppState;

/// The strategy desk page, embedded at compile time from `ui/`.
#[derive(RustEmbed)]
#[folder = "ui/"]
struct UiAssets;

pub fn static_router() -> Router<AppState> {
    Router::new().fallback(serve_static)
}

async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    match UiAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            asset(mime.as_ref(), content.data.into_owned())
        }
        // SPA fallback: serve index.html for all unmatched paths
        None => match UiAssets::get("index.html") {
            Some(index) => asset("text/html; charset=utf-8", index.data.into_owned()),
            None => (StatusCode::NOT_FOUND, "UI not bundled").into_response(),
        },
    }
}

fn asset(content_type: &str, body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, content_type.to_string())], Body::from(body)).into_response()
}
