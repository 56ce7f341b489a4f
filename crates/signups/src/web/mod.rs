//! HTTP surface of the signup service.
//!
//! Routes are plain request/response transformations over the [`Store`];
//! the only state a handler sees is the store handle in [`AppState`].

mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{delete, get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::store::Store;

pub use handlers::{AuthStatus, EmailParams, Message, INDEX_PATH};

/// Path prefix the front-end is served under.
pub const STATIC_PREFIX: &str = "/static";

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Store handle; documents are reloaded on every use.
    pub store: Arc<Store>,
}

impl AppState {
    /// Wrap a store for use as router state.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

impl FromRef<AppState> for Arc<Store> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

/// Build the application router.
///
/// API routes are registered on the router; files under `static_dir` are
/// served below [`STATIC_PREFIX`].
pub fn build_router(state: AppState, static_dir: impl Into<PathBuf>) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/activities", get(handlers::activities_handler))
        .route("/auth/status", get(handlers::auth_status_handler))
        .route("/activities/:name/signup", post(handlers::signup_handler))
        .route(
            "/activities/:name/unregister",
            delete(handlers::unregister_handler),
        )
        .nest_service(STATIC_PREFIX, ServeDir::new(static_dir.into()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .with_state(state)
}

/// Check the store, bind the configured address and serve until a shutdown
/// signal arrives.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded, the address cannot be
/// bound, or the server fails.
pub async fn serve(config: &Config) -> Result<()> {
    let store = Store::from_config(config);
    store.check()?;

    let addr: SocketAddr = config.socket_addr()?;
    let static_dir = config.static_dir();
    info!("serving front-end from {}", static_dir.display());

    let app = build_router(AppState::new(store), static_dir);

    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
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

    info!("signal received, starting graceful shutdown");
}
