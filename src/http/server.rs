//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with every treasury route
//! - Wire up middleware (request id, tracing, CORS, timeout, metrics)
//! - Serve on a bound listener until shutdown

use axum::{
    error_handling::HandleErrorLayer,
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    BoxError, Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{ListenerConfig, TreasuryConfig};
use crate::http::handlers;
use crate::http::request::{make_span, propagate_request_id_layer, set_request_id_layer};
use crate::http::response::ApiError;
use crate::lifecycle::shutdown;
use crate::lifecycle::AppContext;
use crate::observability::metrics;

/// Application state injected into handlers.
///
/// `ctx` is `None` when startup could not reach the chain.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Option<Arc<AppContext>>,
}

/// HTTP server for the treasury API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &TreasuryConfig, ctx: Option<Arc<AppContext>>) -> Self {
        let router = Self::build_router(&config.listener, AppState { ctx });
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &ListenerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::health))
            .route("/health", get(handlers::health))
            .route("/api/health", get(handlers::health))
            .route("/status", get(handlers::health))
            .route("/api/earn", post(handlers::earn))
            .route("/api/fund/treasury", post(handlers::earn))
            .route("/api/claim/earnings", post(handlers::withdraw))
            .route("/withdraw", post(handlers::withdraw))
            .route("/api/withdraw", post(handlers::withdraw))
            .route("/api/fund/contract", post(handlers::fund_contract))
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(propagate_request_id_layer())
                    .layer(CorsLayer::permissive())
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs))),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Turn middleware failures into the standard error body.
///
/// Spawned chain work keeps running after a timeout.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(format!("unhandled middleware error: {err}"))
    }
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let method = request.method().clone();

    let response = next.run(request).await;
    metrics::record_request(method.as_str(), &path, response.status().as_u16(), start);
    response
}
