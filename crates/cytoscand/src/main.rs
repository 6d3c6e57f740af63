//! Cytoscan Daemon - diagnostic wizard server
//!
//! Loads the scaler and classifier once, then serves the step wizard and the
//! prediction API.

use anyhow::Result;
use cytoscan_common::Config;
use cytoscand::server::{self, AppState};
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_level(true)
        .init();

    info!("Cytoscan Daemon v{} starting", cytoscan_common::VERSION);

    let config = Config::load();

    // Without artifacts no prediction can be served
    let adapter = server::load_adapter(&config)?;

    let state = AppState::new(config, adapter)?;
    server::run(state).await
}
