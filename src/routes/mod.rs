use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::app::AppState;
use crate::error::AppError;
use crate::state::ErrorView;

mod analyze;
mod upload;

/// All routes:
///
/// ```text
/// GET  /                                  upload form
/// POST /                                  multipart `file` → 303 /analyze/<name>
/// GET  /analyze/{filename}                column list
/// POST /analyze/{filename}                form `column` → page with plot
/// GET  /analyze/{filename}/plot.png       ?column= → PNG bytes
/// GET  /static/plots/{token}              stored plot
/// GET  /healthz                           liveness
/// ```
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(upload::show_form).post(upload::receive))
        .route(
            "/analyze/{filename}",
            get(analyze::show).post(analyze::submit),
        )
        .route("/analyze/{filename}/plot.png", get(analyze::plot_png))
        .route("/static/plots/{token}", get(stored_plot))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn stored_plot(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    let Some(path) = state.plots.path_for_token(&token) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => png_response(bytes),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

fn png_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

/// HTML error page with the given status.
fn error_page(
    state: &AppState,
    status: StatusCode,
    title: &str,
    message: String,
) -> Result<Response, AppError> {
    let html = state.pages.error(&ErrorView {
        title: title.to_string(),
        message,
    })?;
    Ok((status, Html(html)).into_response())
}
