//! Request multiplexing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, raw URL, headers, body)
//!     → dispatcher.rs (CORS, OPTIONS short-circuit, path normalization)
//!     → boundary.rs (catch errors and panics from here on)
//!     → routing::RouteTable (first matching route, bound parameter)
//!     → handler.rs (invoke business logic with request + response sink)
//!     → Return: exactly one response
//! ```
//!
//! # Design Decisions
//! - Implemented once; each function only supplies its route table
//! - Core responses are limited to 200 (preflight), 404 and 500
//! - Handler faults never propagate past the boundary

pub mod boundary;
pub mod dispatcher;
pub mod handler;

pub use boundary::{ErrorBoundary, FaultContext};
pub use dispatcher::Dispatcher;
pub use handler::{handler_fn, Handler, HandlerError, HandlerFuture, HandlerRef};

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// `OPTIONS` answered by the CORS layer.
    Preflight,
    /// A handler ran and wrote its own response.
    Handled,
    /// No route accepted the request; 404 written.
    NotFound,
    /// The boundary caught a failure.
    Faulted,
}

impl DispatchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchOutcome::Preflight => "preflight",
            DispatchOutcome::Handled => "handled",
            DispatchOutcome::NotFound => "not_found",
            DispatchOutcome::Faulted => "faulted",
        }
    }
}
