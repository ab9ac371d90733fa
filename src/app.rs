use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use crate::config::Config;
use crate::routes;
use crate::storage::{PlotStore, UploadStore};
use crate::ui::pages::Pages;

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Handles shared by every request. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub uploads: Arc<UploadStore>,
    pub plots: Arc<PlotStore>,
    pub pages: Arc<Pages>,
}

impl AppState {
    /// Creates the upload and plot directories if they are missing.
    pub fn new(config: Config) -> Result<Self> {
        let uploads = UploadStore::open(
            &config.upload_dir,
            config.allowed_extensions.clone(),
            config.allowed_extensions_label(),
        )
        .context("preparing upload directory")?;
        let plots = PlotStore::open(config.plot_dir()).context("preparing plot directory")?;
        let pages = Pages::new().context("compiling page templates")?;

        Ok(Self {
            config: Arc::new(config),
            uploads: Arc::new(uploads),
            plots: Arc::new(plots),
            pages: Arc::new(pages),
        })
    }
}

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        "Serving on http://{addr} (uploads in {}, allowed: {})",
        state.config.upload_dir.display(),
        state.config.allowed_extensions_label()
    );

    axum::serve(listener, routes::router(state))
        .await
        .context("serving HTTP")
}
