//! Operator-facing fault reporting.
//!
//! # Responsibilities
//! - Describe a fault caught by the error boundary
//! - Deliver it to an injected sink (tracing in production, memory in tests)
//!
//! # Design Decisions
//! - Fault detail (error source chain, panic payload) goes here, never to
//!   the client
//! - The sink is a trait object so the boundary stays testable

use std::error::Error as StdError;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use axum::http::Method;

/// What went wrong inside the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The handler returned an error.
    Error,
    /// The handler or matching code panicked.
    Panic,
    /// The handler finished without writing a response.
    NoResponse,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FaultKind::Error => "error",
            FaultKind::Panic => "panic",
            FaultKind::NoResponse => "no_response",
        })
    }
}

/// One fault, as recorded for operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub function: String,
    pub method: Method,
    pub path: String,
    pub request_id: String,
    pub kind: FaultKind,
    pub message: String,
    /// Source chain of the error, outermost cause first.
    pub causes: Vec<String>,
    /// Whether the handler had already sent a response.
    pub response_sent: bool,
}

/// Collect the `source()` chain of an error into strings.
pub fn error_causes(error: &(dyn StdError + 'static)) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes
}

/// Destination for faults caught by the error boundary.
pub trait OperatorLog: Send + Sync {
    fn record(&self, fault: &Fault);
}

/// Emits faults as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOperatorLog;

impl OperatorLog for TracingOperatorLog {
    fn record(&self, fault: &Fault) {
        tracing::error!(
            function = %fault.function,
            method = %fault.method,
            path = %fault.path,
            request_id = %fault.request_id,
            kind = %fault.kind,
            causes = ?fault.causes,
            response_sent = fault.response_sent,
            "Handler fault: {}",
            fault.message
        );
    }
}

/// Keeps faults in memory; used by tests and diagnostics.
#[derive(Debug, Default)]
pub struct MemoryOperatorLog {
    faults: Mutex<Vec<Fault>>,
}

impl MemoryOperatorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn faults(&self) -> Vec<Fault> {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OperatorLog for MemoryOperatorLog {
    fn record(&self, fault: &Fault) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(fault.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn test_error_causes() {
        let err = Outer(Inner);
        assert_eq!(error_causes(&err), vec!["inner".to_string()]);
        assert!(error_causes(&Inner).is_empty());
    }

    #[test]
    fn test_memory_log_records() {
        let log = MemoryOperatorLog::new();
        let fault = Fault {
            function: "payments".into(),
            method: Method::POST,
            path: "/api/payments/calculate".into(),
            request_id: "r1".into(),
            kind: FaultKind::Error,
            message: "boom".into(),
            causes: vec![],
            response_sent: false,
        };
        log.record(&fault);
        TracingOperatorLog.record(&fault);
        assert_eq!(log.faults(), vec![fault]);
    }
}
