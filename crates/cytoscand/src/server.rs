//! HTTP server for cytoscand

use crate::metrics::WizardMetrics;
use crate::routes;
use crate::sessions::SessionStore;
use anyhow::{bail, Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use cytoscan_common::{catalog, Config, InferenceAdapter};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Maximum body size: 64 KiB
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Application state shared across handlers
pub struct AppState {
    pub adapter: Arc<InferenceAdapter>,
    pub sessions: SessionStore,
    pub metrics: WizardMetrics,
    pub config: Config,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, adapter: InferenceAdapter) -> Result<Self> {
        let sessions = SessionStore::new(config.session.ttl(), config.session.cookie_name.clone());
        let metrics = WizardMetrics::new().context("registering metrics")?;
        Ok(Self {
            adapter: Arc::new(adapter),
            sessions,
            metrics,
            config,
            start_time: Instant::now(),
        })
    }
}

/// Load the artifacts named in the config and check them against the catalog
pub fn load_adapter(config: &Config) -> Result<InferenceAdapter> {
    let artifacts = &config.artifacts;
    let adapter = InferenceAdapter::load(&artifacts.scaler_path, &artifacts.model_path)
        .context("loading inference artifacts")?;
    if adapter.input_dim() != catalog::feature_count() {
        bail!(
            "artifacts expect {} features but the catalog defines {}",
            adapter.input_dim(),
            catalog::feature_count()
        );
    }
    Ok(adapter)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::wizard_routes())
        .merge(routes::api_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
}

/// Periodically drop idle sessions
fn spawn_session_sweeper(state: Arc<AppState>) {
    let interval = state.config.session.sweep_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let removed = state.sessions.sweep().await;
            let active = state.sessions.len().await;
            state.metrics.active_sessions.set(active as i64);
            if removed > 0 {
                debug!("Expired {} session(s), {} active", removed, active);
            }
        }
    });
}

/// Run the HTTP server until ctrl-c
pub async fn run(state: AppState) -> Result<()> {
    let state = Arc::new(state);
    let addr = state.config.server.bind.clone();

    spawn_session_sweeper(state.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gracefully");
        })
        .await?;
    Ok(())
}
