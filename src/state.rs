use serde::Serialize;

use crate::data::model::ColumnError;
use crate::storage::RenderedPlot;

// ---------------------------------------------------------------------------
// Column selection outcome
// ---------------------------------------------------------------------------

/// What happened to the column submitted with an analysis request.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// No column was submitted.
    Unselected,
    /// The column was plotted.
    Plotted { column: String, plot: RenderedPlot },
    /// The column could not be plotted.
    Rejected { column: String, error: ColumnError },
}

/// Result of one analysis request.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub filename: String,
    /// Column names in header order.
    pub columns: Vec<String>,
    pub selection: Selection,
}

// ---------------------------------------------------------------------------
// Page state
// ---------------------------------------------------------------------------

/// Everything the upload page shows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadView {
    pub error: Option<String>,
    pub allowed_extensions: String,
}

/// Everything the analysis page shows, independent of rendering.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisView {
    pub filename: String,
    pub columns: Vec<String>,
    /// URL of the rendered plot, if one was produced by this request.
    pub plot_path: Option<String>,
    /// The submitted column, echoed back even when it was rejected.
    pub selected_column: Option<String>,
    /// Validation message for a rejected column.
    pub notice: Option<String>,
}

impl From<Analysis> for AnalysisView {
    fn from(analysis: Analysis) -> Self {
        let mut view = AnalysisView {
            filename: analysis.filename,
            columns: analysis.columns,
            ..Default::default()
        };
        match analysis.selection {
            Selection::Unselected => {}
            Selection::Plotted { column, plot } => {
                view.plot_path = Some(plot.url);
                view.selected_column = Some(column);
            }
            Selection::Rejected { column, error } => {
                view.notice = Some(error.to_string());
                view.selected_column = Some(column);
            }
        }
        view
    }
}

/// Everything the error page shows.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub title: String,
    pub message: String,
}
