//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, request log, encoding probe)
//! - Bind server to listener
//! - Serve until the shutdown broadcast fires

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::UpstreamConfig;
use crate::http::handlers;
use crate::http::middleware::{encoding_probe, log_request};
use crate::http::request::request_id_layer;
use crate::probe::ProbeConfig;

/// Routes served, as logged on startup.
pub const ENDPOINTS: [&str; 3] = ["/healthz", "/gzip/json", "/gzip/sse?chunks=3&delayMs=300"];

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bound on body chunks queued per SSE response.
    pub channel_capacity: usize,
}

/// HTTP server for the upstream.
pub struct HttpServer {
    router: Router,
    config: UpstreamConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: UpstreamConfig) -> Self {
        let state = AppState {
            channel_capacity: config.stream.channel_capacity,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost-last: request ID first, then tracing, then the
    /// request log, then the probe closest to the handlers.
    fn build_router(config: &UpstreamConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/healthz", get(handlers::healthz))
            .route("/gzip/json", get(handlers::gzip_json))
            .route("/gzip/sse", get(handlers::gzip_sse))
            .with_state(state);

        if config.probe.enabled {
            // Validation has already parsed the document once.
            let probe = ProbeConfig::try_from(&config.probe).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Probe config rejected, using debug_mode switch");
                ProbeConfig {
                    debug_mode: config.probe.debug_mode,
                }
            });
            tracing::debug!(debug_mode = probe.debug_mode, "Encoding probe enabled");
            router = router.layer(middleware::from_fn_with_state(probe, encoding_probe));
        }

        router
            .layer(middleware::from_fn(log_request))
            .layer(TraceLayer::new_for_http())
            .layer(request_id_layer())
    }

    /// The router, for in-process use (e.g. `tower::ServiceExt::oneshot`).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires (or its sender is
    /// dropped). In-flight responses drain before this returns.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            probe = self.config.probe.enabled,
            "HTTP server starting"
        );
        for endpoint in ENDPOINTS {
            tracing::info!("  GET http://{addr}{endpoint}");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown requested");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
