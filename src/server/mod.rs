//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::keycloak::KeycloakClient;
use crate::repository::{PersonRepository, StaticPersonRepository};
use crate::service::BulkImportService;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub bulk_import_service: Arc<BulkImportService>,
    pub person_repo: Arc<dyn PersonRepository>,
    /// Cancelled when the process is shutting down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the Keycloak client, person source and importer from `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let keycloak_client =
            KeycloakClient::new(config.keycloak.clone()).context("Failed to build HTTP client")?;

        let person_repo = match &config.import.people_file {
            Some(path) => {
                let repo = StaticPersonRepository::from_json_file(path)?;
                info!("Loaded {} people from {}", repo.len(), path.display());
                repo
            }
            None => {
                let repo = StaticPersonRepository::builtin();
                info!("Using built-in list of {} people", repo.len());
                repo
            }
        };

        let bulk_import_service = Arc::new(BulkImportService::new(
            Arc::new(keycloak_client),
            &config.import,
        ));

        Ok(Self {
            config: Arc::new(config),
            bulk_import_service,
            person_repo: Arc::new(person_repo),
            shutdown: CancellationToken::new(),
        })
    }
}

/// Run the HTTP server until Ctrl-C / SIGTERM
pub async fn run(config: Config) -> Result<()> {
    let addr = config.http_addr();
    let state = AppState::from_config(config)?;
    let shutdown = state.shutdown.clone();

    info!(
        realm = %state.config.keycloak.realm,
        username_field = %state.config.import.username_field,
        "Keycloak target configured"
    );

    let app = build_router(state);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM, cancelling `token` so a running import
/// stops before its next person.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
    token.cancel();
}

/// Build the HTTP router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health::health))
        .route("/users/bulk-create", post(api::user::bulk_create))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
