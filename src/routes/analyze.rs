use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use log::{error, warn};
use serde::Deserialize;

use super::{error_page, png_response};
use crate::analysis;
use crate::app::AppState;
use crate::error::{column_status, AnalysisError, AppError};
use crate::state::{AnalysisView, Selection};

/// Body of `POST /analyze/{filename}` and query of the PNG endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ColumnForm {
    pub column: Option<String>,
}

impl ColumnForm {
    /// An empty field counts as no selection.
    fn into_column(self) -> Option<String> {
        self.column.filter(|c| !c.is_empty())
    }
}

pub async fn show(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    analysis_page(state, filename, None).await
}

pub async fn submit(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Form(form): Form<ColumnForm>,
) -> Result<Response, AppError> {
    analysis_page(state, filename, form.into_column()).await
}

async fn analysis_page(
    state: AppState,
    filename: String,
    column: Option<String>,
) -> Result<Response, AppError> {
    let uploads = state.uploads.clone();
    let plots = state.plots.clone();
    let outcome = {
        let filename = filename.clone();
        tokio::task::spawn_blocking(move || {
            analysis::analyze(&uploads, &plots, &filename, column.as_deref())
        })
        .await?
    };

    match outcome {
        Ok(analysis) => {
            let status = match &analysis.selection {
                Selection::Rejected { error, .. } => column_status(error),
                _ => StatusCode::OK,
            };
            let html = state.pages.analysis(&AnalysisView::from(analysis))?;
            Ok((status, Html(html)).into_response())
        }
        Err(err) => analysis_error_page(&state, &filename, err),
    }
}

fn analysis_error_page(
    state: &AppState,
    filename: &str,
    err: AnalysisError,
) -> Result<Response, AppError> {
    let status = err.status();
    if status.is_server_error() {
        error!("Analysis of {filename} failed: {err}");
        return error_page(
            state,
            status,
            "Analysis failed",
            "Something went wrong while analysing the file.".to_string(),
        );
    }
    warn!("Analysis of {filename} rejected: {err}");
    error_page(state, status, "Cannot analyse file", err.to_string())
}

/// PNG bytes straight in the response; nothing is written to disk.
pub async fn plot_png(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(query): Query<ColumnForm>,
) -> Result<Response, AppError> {
    let Some(column) = query.into_column() else {
        return Ok((StatusCode::BAD_REQUEST, "Missing column parameter").into_response());
    };

    let uploads = state.uploads.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let dataset = analysis::load_dataset(&uploads, &filename)?;
        analysis::column_png(&dataset, &column)
    })
    .await?;

    match outcome {
        Ok(png) => Ok(png_response(png)),
        Err(AnalysisError::Column(err)) => {
            let status = match column_status(&err) {
                StatusCode::OK => StatusCode::NOT_FOUND,
                other => other,
            };
            Ok((status, err.to_string()).into_response())
        }
        Err(err) if err.status().is_server_error() => Err(err.into()),
        Err(err) => Ok((err.status(), err.to_string()).into_response()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use tower::ServiceExt;

    use super::super::tests::{
        form_request, get_request, multipart_request, send, test_app, TestApp,
    };
    use super::*;

    async fn uploaded(csv: &str) -> TestApp {
        let app = test_app();
        let (status, _, _) =
            send(&app.router, multipart_request("file", Some("data.csv"), csv)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        app
    }

    fn plot_files(app: &TestApp) -> usize {
        std::fs::read_dir(app.dir.path().join("static/plots"))
            .unwrap()
            .count()
    }

    #[tokio::test]
    async fn repeated_headers_are_listed_with_suffixes() {
        let app = uploaded("a,a\n1,2\n3,4").await;
        let (status, _, html) = send(&app.router, get_request("/analyze/data.csv")).await;
        assert_eq!(status, StatusCode::OK);
        let first = html.find("<li>a</li>").unwrap();
        let second = html.find("<li>a.1</li>").unwrap();
        assert!(first < second);

        let (status, _, html) =
            send(&app.router, form_request("/analyze/data.csv", "column=a.1")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<option value="a.1" selected>a.1</option>"#));
        assert!(html.contains(r#"id="plot""#));
    }

    #[tokio::test]
    async fn outlier_column_still_plots() {
        let mut csv = String::from("v\n");
        for i in 0..50 {
            csv.push_str(&format!("{}\n", 10.0 + f64::from(i) * 0.01));
        }
        csv.push_str("1e15\n");
        let app = uploaded(&csv).await;
        let (status, _, html) =
            send(&app.router, form_request("/analyze/data.csv", "column=v")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"id="plot""#));
        assert_eq!(plot_files(&app), 1);
    }

    #[tokio::test]
    async fn unknown_column_renders_notice_without_plot() {
        let app = uploaded("a,b\n1,2\n3,4").await;
        let (status, _, html) =
            send(&app.router, form_request("/analyze/data.csv", "column=nope")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"id="notice""#));
        assert!(!html.contains(r#"id="plot""#));
        assert_eq!(plot_files(&app), 0);
    }

    #[tokio::test]
    async fn empty_column_field_is_no_selection() {
        let app = uploaded("a,b\n1,2\n3,4").await;
        let (status, _, html) =
            send(&app.router, form_request("/analyze/data.csv", "column=")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!html.contains(r#"id="notice""#));
        assert!(!html.contains(" selected"));
    }

    #[tokio::test]
    async fn text_column_is_unprocessable() {
        let app = uploaded("name,v\nann,1\nbob,2").await;
        let (status, _, html) =
            send(&app.router, form_request("/analyze/data.csv", "column=name")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("not numeric"));
        assert!(html.contains("<li>v</li>"));
        assert_eq!(plot_files(&app), 0);
    }

    #[tokio::test]
    async fn each_request_gets_its_own_plot() {
        let app = uploaded("a,b\n1,2\n3,4\n5,9").await;
        send(&app.router, form_request("/analyze/data.csv", "column=a")).await;
        send(&app.router, form_request("/analyze/data.csv", "column=b")).await;
        assert_eq!(plot_files(&app), 2);
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let app = test_app();
        let (status, _, html) = send(&app.router, get_request("/analyze/none.csv")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("not found"));
    }

    #[tokio::test]
    async fn encoded_traversal_is_rejected() {
        let app = uploaded("a\n1").await;
        let (status, _, _) =
            send(&app.router, get_request("/analyze/..%2Fuploads%2Fdata.csv")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_csv_is_unprocessable() {
        let app = test_app();
        send(&app.router, multipart_request("file", Some("bad.csv"), "a,b\n1,2,3")).await;
        let (status, _, html) = send(&app.router, get_request("/analyze/bad.csv")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("Could not read"));
    }

    #[tokio::test]
    async fn png_endpoint_returns_image_bytes() {
        let app = uploaded("a,b\n1,2\n3,4\n5,9").await;
        let response = app
            .router
            .clone()
            .oneshot(get_request("/analyze/data.csv/plot.png?column=b"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(plot_files(&app), 0);
    }

    #[tokio::test]
    async fn png_endpoint_errors() {
        let app = uploaded("a,t\n1,x").await;
        let (status, _, _) = send(&app.router, get_request("/analyze/data.csv/plot.png")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, body) = send(
            &app.router,
            get_request("/analyze/data.csv/plot.png?column=zz"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Column 'zz' not found");

        let (status, _, _) = send(
            &app.router,
            get_request("/analyze/data.csv/plot.png?column=t"),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
