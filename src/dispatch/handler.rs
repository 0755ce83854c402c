//! Handler invocation contract.
//!
//! A handler receives the original request (with the bound path parameter
//! attached as an extension) and a [`ResponseSink`]. It owns writing the
//! response exactly once and reports failure through [`HandlerError`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use thiserror::Error;

use crate::http::response::{ResponseSink, SinkError};

/// Boxed future returned by [`Handler::call`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send>>;

/// Shared, immutable reference to a handler.
pub type HandlerRef = Arc<dyn Handler>;

/// Failures a handler hands back to the error boundary.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    UpstreamStatus(StatusCode),

    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("{0}")]
    Message(String),
}

impl HandlerError {
    pub fn msg(message: impl Into<String>) -> Self {
        HandlerError::Message(message.into())
    }
}

/// Business logic behind one route.
pub trait Handler: Send + Sync {
    fn call(&self, request: Request<Body>, response: ResponseSink) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>, ResponseSink) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn call(&self, request: Request<Body>, response: ResponseSink) -> HandlerFuture {
        Box::pin(self(request, response))
    }
}

/// Wrap an async closure as a [`HandlerRef`].
pub fn handler_fn<F, Fut>(f: F) -> HandlerRef
where
    F: Fn(Request<Body>, ResponseSink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    Arc::new(f)
}
