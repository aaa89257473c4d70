//! HTTP listener for registry notifications.
//!
//! The registry expects a quick acknowledgment, so every notification post
//! is answered with `200 OK` as soon as its body is read and processed in a
//! spawned task. At most `max_in_flight` payloads are processed at once;
//! further tasks wait for a slot.
//!
//! Routes:
//! - `GET /health` - audit store connectivity (`200` or `503`)
//! - anything else - a notification envelope

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use regstat_audit::AuditStore;
use serde::Serialize;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Result, ServerError};

/// How long shutdown waits for spawned payload tasks to finish.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state of the router.
#[derive(Clone)]
pub struct AppState {
    dispatcher: Dispatcher,
    store: Arc<dyn AuditStore>,
    permits: Arc<Semaphore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Creates router state allowing `max_in_flight` concurrent payloads.
    pub fn new(dispatcher: Dispatcher, store: Arc<dyn AuditStore>, max_in_flight: usize) -> Self {
        Self {
            dispatcher,
            store,
            permits: Arc::new(Semaphore::new(max_in_flight)),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `unavailable`.
    pub status: &'static str,
    /// Server version.
    pub version: &'static str,
}

/// Builds the listener's router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(notify)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let version = env!("CARGO_PKG_VERSION");
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                version,
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    version,
                }),
            )
        }
    }
}

async fn notify(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let AppState {
        dispatcher,
        permits,
        ..
    } = state;

    tokio::spawn(async move {
        let Ok(_permit) = permits.acquire_owned().await else {
            warn!("Listener shutting down, dropping notification payload");
            return;
        };
        // Failures are logged by the dispatcher.
        let _ = dispatcher.process_payload(&body).await;
    });

    StatusCode::OK
}

/// Handle to a running listener.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<Result<()>>,
}

impl ServerHandle {
    /// The address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting requests and waits for in-flight payloads to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener failed while serving.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        self.task
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?
    }
}

/// Notification listener.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Create a listener dispatching payloads to `dispatcher`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: ServerConfig,
        dispatcher: Dispatcher,
        store: Arc<dyn AuditStore>,
    ) -> Result<Self> {
        config.validate()?;
        let state = AppState::new(dispatcher, store, config.max_in_flight);
        Ok(Self { config, state })
    }

    /// Get the server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the router serving this listener's routes.
    #[must_use]
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Bind the listener and serve in a background task.
    ///
    /// Returns a handle that can be used to trigger graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn run(self) -> Result<ServerHandle> {
        let addr = self.config.bind_address;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = self.router();
        let permits = Arc::clone(&self.state.permits);
        let max_in_flight = self.config.max_in_flight;

        info!(%local_addr, max_in_flight, "Listening for registry notifications");

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    info!("Listener shutdown signal received");
                })
                .await
                .map_err(ServerError::Serve)?;

            drain(&permits, max_in_flight).await;
            Ok(())
        });

        Ok(ServerHandle {
            local_addr,
            shutdown_tx,
            task,
        })
    }

    /// Run the listener until Ctrl-C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn run_until_shutdown(self) -> Result<()> {
        let handle = self.run().await?;
        shutdown_signal().await;
        info!("Shutting down listener...");
        handle.shutdown().await
    }
}

/// Waits until every spawned payload task has released its permit, then
/// closes the semaphore so late tasks drop their payloads.
async fn drain(permits: &Semaphore, max_in_flight: usize) {
    let total = u32::try_from(max_in_flight).unwrap_or(u32::MAX);
    match tokio::time::timeout(DRAIN_TIMEOUT, permits.acquire_many(total)).await {
        Ok(Ok(_all)) => info!("All notification payloads processed"),
        Ok(Err(_)) => {}
        Err(_) => error!(
            timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "Timed out waiting for notification payloads"
        ),
    }
    permits.close();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
