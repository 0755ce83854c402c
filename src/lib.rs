//! Vehicle listing API: per-function HTTP request multiplexing.

// Core subsystems
pub mod config;
pub mod dispatch;
pub mod http;
pub mod routing;

// Functions and their business logic
pub mod functions;
pub mod handlers;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::AppConfig;
pub use dispatch::Dispatcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
