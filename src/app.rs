//! Application assembly: configuration, catalog load, HTTP serving, and
//! shutdown handling.

use crate::catalog::{Catalog, loader};
use crate::cli::Args;
use crate::config::Config;
use crate::state::AppState;
use anyhow::Context;
use figment::{Figment, providers::Env};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
}

/// Extracts [`Config`] from the environment. Called before logging setup so
/// the chosen log level applies from the first line.
pub fn load_config() -> Result<Config, anyhow::Error> {
    Figment::new()
        .merge(Env::raw())
        .extract()
        .context("Failed to load config")
}

impl App {
    /// Create a new App instance with the lecture catalog loaded.
    ///
    /// A missing or unreadable lecture table is non-fatal: the service comes
    /// up with an empty store, `/api/lectures` answers 500, and optimization
    /// tasks fail with a clear error instead of the process crashing.
    pub fn new(args: &Args, config: Config) -> Self {
        let data_path = args
            .data_path
            .clone()
            .unwrap_or_else(|| config.data_path.clone());

        let catalog = match loader::load_catalog(&data_path) {
            Ok(catalog) => {
                info!(
                    lectures = catalog.len(),
                    path = %data_path.display(),
                    "lecture catalog loaded"
                );
                Arc::new(catalog)
            }
            Err(e) => {
                warn!(
                    error = ?e,
                    path = %data_path.display(),
                    "failed to load lecture catalog; starting with an empty store"
                );
                Arc::new(Catalog::default())
            }
        };

        let app_state = AppState::new(catalog);
        App { config, app_state }
    }

    /// Serves the API until a shutdown signal arrives.
    pub async fn run(self) -> ExitCode {
        let router = crate::web::create_router(self.app_state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));

        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(error = ?e, %addr, "failed to bind listener");
                return ExitCode::FAILURE;
            }
        };
        info!(%addr, "web server listening");

        match axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            Ok(()) => {
                info!("shutdown complete");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = ?e, "server error");
                ExitCode::FAILURE
            }
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
