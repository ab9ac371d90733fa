use log::{info, warn};

use crate::color::ChartTheme;
use crate::data::loader;
use crate::data::model::{ColumnError, TabularDataset};
use crate::data::stats::Distribution;
use crate::error::AnalysisError;
use crate::state::{Analysis, Selection};
use crate::storage::{PlotStore, UploadStore};
use crate::ui::plot;

/// Parse a stored upload. Runs on every request; nothing is cached.
pub fn load_dataset(
    uploads: &UploadStore,
    filename: &str,
) -> Result<TabularDataset, AnalysisError> {
    let path = uploads.path_for(filename)?;
    if !path.is_file() {
        return Err(AnalysisError::NotFound(filename.to_string()));
    }
    loader::load_file(&path).map_err(|err| AnalysisError::Load {
        filename: filename.to_string(),
        message: format!("{err:#}"),
    })
}

/// Histogram + density PNG for one column.
pub fn column_png(dataset: &TabularDataset, column: &str) -> Result<Vec<u8>, AnalysisError> {
    let values = dataset.numeric_column(column)?;
    let dist = Distribution::from_values(&values)
        .ok_or_else(|| ColumnError::Empty(column.to_string()))?;

    let theme = dataset
        .column_index(column)
        .map(|idx| ChartTheme::for_column(idx, dataset.column_names.len()))
        .unwrap_or_default();

    plot::distribution_png(column, &dist, &theme).map_err(AnalysisError::Render)
}

/// Load `filename` and, when `column` is given, plot it under a fresh token.
///
/// Column problems are part of the returned [`Analysis`]; only file-level
/// and internal failures are errors.
pub fn analyze(
    uploads: &UploadStore,
    plots: &PlotStore,
    filename: &str,
    column: Option<&str>,
) -> Result<Analysis, AnalysisError> {
    let dataset = load_dataset(uploads, filename)?;

    let selection = match column {
        None => Selection::Unselected,
        Some(column) => match column_png(&dataset, column) {
            Ok(png) => {
                let plot = plots.save(&png)?;
                info!(
                    "Rendered distribution of '{column}' from {filename} as plot {} ({})",
                    plot.token,
                    plot.path.display()
                );
                Selection::Plotted {
                    column: column.to_string(),
                    plot,
                }
            }
            Err(AnalysisError::Column(error)) => {
                warn!("Skipping plot for {filename}: {error}");
                Selection::Rejected {
                    column: column.to_string(),
                    error,
                }
            }
            Err(other) => return Err(other),
        },
    };

    Ok(Analysis {
        filename: filename.to_string(),
        columns: dataset.column_names,
        selection,
    })
}
