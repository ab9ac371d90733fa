mod analysis;
mod app;
mod color;
mod config;
mod data;
mod error;
mod routes;
mod state;
mod storage;
mod ui;

use anyhow::{Context, Result};

use app::AppState;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load().context("loading configuration")?;
    let state = AppState::new(config)?;
    app::serve(state).await
}
