//! Response sink and core response envelopes.
//!
//! # Responsibilities
//! - Give handlers a single place to write status, headers and body
//! - Track whether a response has already been sent
//! - Reject a second write instead of silently replacing the first
//! - Define the three responses the core writes on its own
//!
//! # Design Decisions
//! - The sink is a cheap clonable handle; every clone shares one state
//! - Bodies are buffered, never streamed
//! - Headers set before sending (e.g. CORS) survive into the final response

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

/// Body of the core's 404 response.
pub const NOT_FOUND_MESSAGE: &str = "Not found";

/// Body of the core's 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors raised while writing through a [`ResponseSink`].
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("response already sent")]
    AlreadySent,

    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
struct SinkState {
    headers: HeaderMap,
    sent: Option<(StatusCode, Bytes)>,
}

/// Write-once response handle shared between the dispatcher and a handler.
#[derive(Debug, Clone, Default)]
pub struct ResponseSink {
    state: Arc<Mutex<SinkState>>,
}

impl ResponseSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink whose response starts with the given headers.
    pub fn with_headers(headers: HeaderMap) -> Self {
        Self {
            state: Arc::new(Mutex::new(SinkState {
                headers,
                sent: None,
            })),
        }
    }

    // A handler that panicked while holding the lock must not take the
    // error boundary down with it.
    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true once a status and body have been written.
    pub fn is_sent(&self) -> bool {
        self.lock().sent.is_some()
    }

    /// Status of the sent response, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.lock().sent.as_ref().map(|(status, _)| *status)
    }

    /// Set a response header. Fails after the response has been sent.
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) -> Result<(), SinkError> {
        let mut state = self.lock();
        if state.sent.is_some() {
            return Err(SinkError::AlreadySent);
        }
        state.headers.insert(name, value);
        Ok(())
    }

    /// Replace every header set so far. Fails after the response has been sent.
    pub fn reset_headers(&self, headers: HeaderMap) -> Result<(), SinkError> {
        let mut state = self.lock();
        if state.sent.is_some() {
            return Err(SinkError::AlreadySent);
        }
        state.headers = headers;
        Ok(())
    }

    /// Send a raw body with the given status.
    pub fn send(&self, status: StatusCode, body: impl Into<Bytes>) -> Result<(), SinkError> {
        let mut state = self.lock();
        if state.sent.is_some() {
            return Err(SinkError::AlreadySent);
        }
        state.sent = Some((status, body.into()));
        Ok(())
    }

    /// Serialize `value` as JSON and send it with the given status.
    pub fn json<T>(&self, status: StatusCode, value: &T) -> Result<(), SinkError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(value)?;
        let mut state = self.lock();
        if state.sent.is_some() {
            return Err(SinkError::AlreadySent);
        }
        state.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        state.sent = Some((status, Bytes::from(body)));
        Ok(())
    }

    /// Send `{"error": message}` with the given status.
    pub fn error(&self, status: StatusCode, message: &str) -> Result<(), SinkError> {
        self.json(status, &ErrorBody { error: message })
    }

    /// Take the written response out of the sink.
    ///
    /// Returns `None` if nothing was sent. The sink keeps reporting
    /// `is_sent() == true` afterwards.
    pub fn take_response(&self) -> Option<Response<Body>> {
        let mut state = self.lock();
        let (status, body) = state.sent.clone()?;
        let headers = std::mem::take(&mut state.headers);
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Some(response)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// The responses the core writes itself. All other shapes come from handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `200` with an empty body, answering a CORS preflight.
    Preflight,
    /// `404 {"error":"Not found"}`.
    NotFound,
    /// `500 {"error":"Internal server error"}`.
    InternalError,
}

impl Envelope {
    pub fn status(self) -> StatusCode {
        match self {
            Envelope::Preflight => StatusCode::OK,
            Envelope::NotFound => StatusCode::NOT_FOUND,
            Envelope::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Write this envelope through the sink.
    pub fn write_to(self, sink: &ResponseSink) -> Result<(), SinkError> {
        match self {
            Envelope::Preflight => sink.send(self.status(), Bytes::new()),
            Envelope::NotFound => sink.error(self.status(), NOT_FOUND_MESSAGE),
            Envelope::InternalError => sink.error(self.status(), INTERNAL_ERROR_MESSAGE),
        }
    }
}
