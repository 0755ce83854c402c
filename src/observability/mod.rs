//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!     → operator_log.rs (faults caught by the error boundary)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows into every dispatch log event
//! - Fault detail is operator-only; clients see a fixed 500 body

pub mod logging;
pub mod metrics;
pub mod operator_log;

pub use logging::init_logging;
pub use operator_log::{Fault, FaultKind, MemoryOperatorLog, OperatorLog, TracingOperatorLog};
