//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout, body limit, request ID, tracing)
//!     → mounted function path → dispatch::Dispatcher
//!     → request.rs (request ID, normalized path, path parameter)
//!     → response.rs (write-once sink, fixed envelopes)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, PathParamExt, RequestIdExt, X_REQUEST_ID};
pub use response::{Envelope, ResponseSink, SinkError};
pub use server::HttpServer;
