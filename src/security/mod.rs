//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Every dispatched request:
//!     → cors.rs (stamp CORS headers onto the response sink)
//!     → OPTIONS? answer the preflight, stop
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - CORS headers are present on every core response, including errors
//! - The policy is fixed per process

pub mod cors;

pub use cors::CorsPolicy;
