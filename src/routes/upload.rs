use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use log::{info, warn};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::app::AppState;
use crate::error::{storage_status, AppError, UploadError};
use crate::state::UploadView;
use crate::storage::{StorageError, StoredFile};

/// Characters escaped in a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Where a stored file is analysed.
pub fn analyze_url(filename: &str) -> String {
    format!("/analyze/{}", utf8_percent_encode(filename, PATH_SEGMENT))
}

pub async fn show_form(State(state): State<AppState>) -> Result<Response, AppError> {
    form_page(&state, StatusCode::OK, None)
}

pub async fn receive(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    match store_upload(&state, &mut multipart).await {
        Ok(stored) => {
            info!("Stored upload {}", stored.path.display());
            Ok(Redirect::to(&analyze_url(&stored.filename)).into_response())
        }
        Err(err @ (UploadError::NoFilePart | UploadError::NoSelectedFile)) => {
            Ok((StatusCode::BAD_REQUEST, err.to_string()).into_response())
        }
        Err(UploadError::Storage(err @ StorageError::Io { .. })) => {
            Err(UploadError::from(err).into())
        }
        Err(UploadError::Storage(err)) => {
            warn!("Rejected upload: {err}");
            form_page(&state, storage_status(&err), Some(err.to_string()))
        }
        Err(UploadError::Multipart(err)) => {
            warn!("Malformed upload: {err}");
            Ok((err.status(), err.body_text()).into_response())
        }
        Err(err @ UploadError::Task(_)) => Err(err.into()),
    }
}

/// Find the `file` part, check its name, then write it to the upload
/// directory.
async fn store_upload(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<StoredFile, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        // A `file` field without a filename is a plain form value, not a file.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filename.is_empty() {
            return Err(UploadError::NoSelectedFile);
        }
        state.uploads.check_upload(&filename)?;

        let bytes = field.bytes().await?;
        let uploads = state.uploads.clone();
        let stored =
            tokio::task::spawn_blocking(move || uploads.save(&filename, &bytes)).await??;
        return Ok(stored);
    }
    Err(UploadError::NoFilePart)
}

fn form_page(
    state: &AppState,
    status: StatusCode,
    error: Option<String>,
) -> Result<Response, AppError> {
    let html = state.pages.upload(&UploadView {
        error,
        allowed_extensions: state.config.allowed_extensions_label(),
    })?;
    Ok((status, Html(html)).into_response())
}
