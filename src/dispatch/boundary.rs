//! Error boundary around matching and handler execution.
//!
//! # Responsibilities
//! - Catch handler errors and panics exactly once per request
//! - Report them to the operator log
//! - Send the 500 envelope unless a response already went out
//!
//! # State Machine
//! ```text
//! PathMatched → HandlerInvoked → ResponseSent
//!                              → Faulted → FallbackSent[500]
//! PathUnmatched → FallbackSent[404]
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::http::{HeaderMap, Method};
use futures_util::FutureExt;

use crate::dispatch::handler::HandlerError;
use crate::dispatch::DispatchOutcome;
use crate::http::response::{Envelope, ResponseSink};
use crate::observability::operator_log::{error_causes, Fault, FaultKind, OperatorLog};

/// Request details attached to every recorded fault.
#[derive(Debug, Clone)]
pub struct FaultContext {
    pub function: String,
    pub method: Method,
    pub path: String,
    pub request_id: String,
}

/// Converts any failure inside `work` into at most one 500 response.
#[derive(Clone)]
pub struct ErrorBoundary {
    log: Arc<dyn OperatorLog>,
}

impl ErrorBoundary {
    pub fn new(log: Arc<dyn OperatorLog>) -> Self {
        Self { log }
    }

    /// Run `work`, which routes the request and writes through `sink`.
    ///
    /// `work` resolves to [`DispatchOutcome::Handled`] after a handler ran,
    /// or [`DispatchOutcome::NotFound`] after the 404 was written. A 500
    /// carries only `base_headers`; whatever the handler set is discarded.
    pub async fn guard<F>(
        &self,
        context: &FaultContext,
        sink: &ResponseSink,
        base_headers: HeaderMap,
        work: F,
    ) -> DispatchOutcome
    where
        F: Future<Output = Result<DispatchOutcome, HandlerError>>,
    {
        let result = AssertUnwindSafe(work).catch_unwind().await;

        let (kind, message, causes) = match result {
            Ok(Ok(DispatchOutcome::Handled)) if !sink.is_sent() => (
                FaultKind::NoResponse,
                "handler completed without writing a response".to_string(),
                Vec::new(),
            ),
            Ok(Ok(outcome)) => return outcome,
            Ok(Err(err)) => {
                let causes = error_causes(&err);
                (FaultKind::Error, err.to_string(), causes)
            }
            Err(payload) => (FaultKind::Panic, panic_message(payload.as_ref()), Vec::new()),
        };

        let response_sent = sink.is_sent();
        self.log.record(&Fault {
            function: context.function.clone(),
            method: context.method.clone(),
            path: context.path.clone(),
            request_id: context.request_id.clone(),
            kind,
            message,
            causes,
            response_sent,
        });

        if !response_sent {
            // Only fails if a handler clone raced us; its response stands.
            if sink.reset_headers(base_headers).is_ok() {
                let _ = Envelope::InternalError.write_to(sink);
            }
        }
        DispatchOutcome::Faulted
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {message}")
    } else {
        "panic with non-string payload".to_string()
    }
}
