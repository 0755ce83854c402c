//! Per-function request dispatcher.
//!
//! # Responsibilities
//! - Apply the CORS policy before anything else touches the response
//! - Answer `OPTIONS` preflights without routing
//! - Normalize the path, match it, and invoke the matched handler
//! - Write the 404 envelope when nothing matches
//! - Produce exactly one response per request
//!
//! # Design Decisions
//! - Stateless between requests; the route table is shared read-only
//! - The handler is awaited to completion before any fallback is written
//! - No timeout of its own; the hosting layer bounds invocations

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Method, Request, Response};

use crate::dispatch::boundary::{ErrorBoundary, FaultContext};
use crate::dispatch::handler::HandlerError;
use crate::dispatch::DispatchOutcome;
use crate::http::request::{normalize_path, raw_url, RequestIdExt};
use crate::http::response::{Envelope, ResponseSink};
use crate::observability::metrics;
use crate::observability::operator_log::{OperatorLog, TracingOperatorLog};
use crate::routing::RouteTable;
use crate::security::CorsPolicy;

/// Multiplexes one function's logical routes behind a single entry point.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
    cors: CorsPolicy,
    boundary: ErrorBoundary,
}

impl Dispatcher {
    /// Dispatcher with the default CORS policy, logging faults via tracing.
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            cors: CorsPolicy::default(),
            boundary: ErrorBoundary::new(Arc::new(TracingOperatorLog)),
        }
    }

    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    pub fn with_operator_log(mut self, log: Arc<dyn OperatorLog>) -> Self {
        self.boundary = ErrorBoundary::new(log);
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Handle one request end to end.
    pub async fn dispatch(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let sink = ResponseSink::with_headers(self.cors.headers());

        let outcome = self.run(request, &sink).await;
        metrics::record_dispatch(self.table.function(), outcome, start);

        match sink.take_response() {
            Some(response) => response,
            None => {
                // Unreachable while the boundary writes its own fallback.
                let fallback = ResponseSink::with_headers(self.cors.headers());
                let _ = Envelope::InternalError.write_to(&fallback);
                fallback.take_response().unwrap_or_default()
            }
        }
    }

    async fn run(&self, request: Request<Body>, sink: &ResponseSink) -> DispatchOutcome {
        if request.method() == Method::OPTIONS {
            let _ = Envelope::Preflight.write_to(sink);
            return DispatchOutcome::Preflight;
        }

        let path = normalize_path(raw_url(&request)).to_string();
        let context = FaultContext {
            function: self.table.function().to_string(),
            method: request.method().clone(),
            path,
            request_id: request.request_id().to_string(),
        };

        let outcome = self
            .boundary
            .guard(&context, sink, self.cors.headers(), self.route(request, &context, sink))
            .await;

        tracing::debug!(
            function = %context.function,
            request_id = %context.request_id,
            method = %context.method,
            path = %context.path,
            outcome = outcome.as_str(),
            "Dispatched request"
        );
        outcome
    }

    async fn route(
        &self,
        mut request: Request<Body>,
        context: &FaultContext,
        sink: &ResponseSink,
    ) -> Result<DispatchOutcome, HandlerError> {
        let Some(matched) = self.table.match_route(&context.method, &context.path) else {
            Envelope::NotFound.write_to(sink)?;
            return Ok(DispatchOutcome::NotFound);
        };

        tracing::debug!(
            function = %context.function,
            request_id = %context.request_id,
            route = %matched.route,
            "Route matched"
        );

        if let Some(param) = matched.param {
            request.extensions_mut().insert(param);
        }
        matched
            .route
            .handler()
            .call(request, sink.clone())
            .await?;
        Ok(DispatchOutcome::Handled)
    }
}
