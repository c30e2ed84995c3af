//! # Initialization
//!
//! Controller startup and shutdown: tracing, metrics, shared state, HTTP
//! server and state reporter.

use crate::config::ControllerConfig;
use crate::observability::{metrics, StateReporter};
use crate::runtime::logging::init_tracing;
use crate::server::{self, ServerState};
use crate::state::ControllerState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Running controller components
pub struct Runtime {
    pub config: ControllerConfig,
    /// Shared state handed to reconcilers
    pub state: Arc<ControllerState>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
    shutdown_tx: watch::Sender<bool>,
    server_handle: JoinHandle<()>,
    reporter_handle: JoinHandle<()>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field(
                "server_ready",
                &self
                    .server_state
                    .is_ready
                    .load(std::sync::atomic::Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// This function handles:
/// - Configuration loading
/// - Tracing subscriber setup
/// - Metrics registration
/// - Shared state construction
/// - HTTP server startup
/// - State reporter startup
pub async fn initialize() -> Result<Runtime> {
    let config = ControllerConfig::from_env().context("Failed to load controller configuration")?;
    init_tracing(config.log_format)?;

    info!("Starting Cert Management Controller");
    info!(
        default_issuer = %config.default_issuer,
        issuer_namespace = %config.issuer_namespace,
        renewal_window_secs = config.renewal_window.as_secs(),
        renewal_overdue_window_secs = config.renewal_overdue_window.as_secs(),
        default_requests_per_day_quota = config.default_requests_per_day_quota,
        cascade_delete = config.cascade_delete,
        "Controller configuration loaded"
    );

    start(config).await
}

/// Starts all components for an already loaded configuration.
///
/// Expects tracing to be set up by the caller.
pub async fn start(config: ControllerConfig) -> Result<Runtime> {
    metrics::register_metrics().context("Failed to register metrics")?;

    let state = Arc::new(ControllerState::new(config.default_requests_per_day_quota));
    let server_state = Arc::new(ServerState::new(Arc::clone(&state)));

    let listener = server::bind(config.metrics_port)
        .await
        .with_context(|| format!("Failed to bind HTTP server on port {}", config.metrics_port))?;
    let server_state_clone = Arc::clone(&server_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reporter = StateReporter::new(Arc::clone(&state));
    let reporter_handle = tokio::spawn(reporter.run(config.metrics_report_interval(), shutdown_rx));

    server_state.set_ready(true);
    info!("Controller initialized");

    Ok(Runtime {
        config,
        state,
        server_state,
        shutdown_tx,
        server_handle,
        reporter_handle,
    })
}

impl Runtime {
    /// Waits for ctrl-c, then shuts down
    pub async fn run_until_signal(self) -> Result<()> {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        info!("Shutdown signal received");
        self.shutdown().await;
        Ok(())
    }

    /// Marks the controller not ready and stops the background tasks
    pub async fn shutdown(self) {
        self.server_state.set_ready(false);
        // Err only means the reporter already stopped
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.reporter_handle.await {
            error!("State reporter task failed: {}", e);
        }
        self.server_handle.abort();
        info!("Controller stopped");
    }
}
