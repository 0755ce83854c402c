//! HTTP server setup.
//!
//! # Responsibilities
//! - Mount every function's dispatcher under its mount path
//! - Send everything else to a fallback dispatcher with an empty table
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - Axum only forwards; matching happens in the function's route table
//! - The invocation timeout lives here, the dispatcher has none
//! - Unmounted paths still get CORS headers and the 404 envelope
//! - Timeout (408) and oversized body (413) are answered here, before any
//!   dispatcher runs, so they carry neither CORS headers nor the envelope
//! - `Timeout` sits innermost: it needs a `Default` response body, which
//!   the body-limit wrapper does not provide

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{any, MethodRouter};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ListenerConfig;
use crate::dispatch::Dispatcher;
use crate::functions::Function;
use crate::http::request::MakeRequestUuid;
use crate::routing::RouteTable;
use crate::security::CorsPolicy;

/// Name reported for requests outside every mounted function.
pub const FALLBACK_FUNCTION: &str = "fallback";

/// HTTP server hosting the configured functions.
pub struct HttpServer {
    router: Router,
    config: ListenerConfig,
}

impl HttpServer {
    /// Create a server for `functions`; `cors` decorates unmounted paths.
    pub fn new(config: ListenerConfig, functions: &[Function], cors: CorsPolicy) -> Self {
        let router = Self::build_router(&config, functions, cors);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ListenerConfig, functions: &[Function], cors: CorsPolicy) -> Router {
        let mut router = Router::new();
        for function in functions {
            let mount = function.kind.mount_path();
            router = router
                .route(mount, forward(function.dispatcher.clone()))
                .route(&format!("{mount}/{{*rest}}"), forward(function.dispatcher.clone()));
        }

        let fallback = Arc::new(
            Dispatcher::new(Arc::new(RouteTable::empty(FALLBACK_FUNCTION))).with_cors(cors),
        );

        router.fallback_service(forward(fallback)).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs))),
        )
    }

    /// The assembled router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.request_timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn forward(dispatcher: Arc<Dispatcher>) -> MethodRouter {
    any(move |request: Request<Body>| {
        let dispatcher = dispatcher.clone();
        async move { dispatcher.dispatch(request).await }
    })
}
