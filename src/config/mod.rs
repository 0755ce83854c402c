//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → used once at startup to build handlers and route tables
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; route tables live for the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, CorsConfig, FinancingConfig, FunctionsConfig, GeocoderConfig, ListenerConfig,
    LogFormat, ObservabilityConfig, UpstreamConfig,
};
pub use validation::ValidationError;
