//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared services from configuration
//! - Build and validate the route table of every enabled function
//! - Wrap each table in a dispatcher carrying the configured CORS policy
//!
//! # Design Decisions
//! - Fail fast: any invalid table is fatal, nothing is served
//! - All problems of one table are reported together

use std::sync::Arc;

use axum::http::header::InvalidHeaderValue;
use thiserror::Error;

use crate::config::AppConfig;
use crate::dispatch::{Dispatcher, HandlerError};
use crate::functions::{build_table, Function};
use crate::handlers::Services;
use crate::routing::RouteTableError;
use crate::security::CorsPolicy;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid CORS header value: {0}")]
    Cors(#[from] InvalidHeaderValue),

    #[error("failed to initialize services: {0}")]
    Services(#[from] HandlerError),

    #[error(transparent)]
    Routes(#[from] RouteTableError),
}

/// Build a dispatcher for every enabled function, in configured order.
pub fn build_functions(config: &AppConfig) -> Result<Vec<Function>, StartupError> {
    let cors = CorsPolicy::from_config(&config.cors)?;
    let services = Services::from_config(config)?;

    let mut functions = Vec::with_capacity(config.functions.enabled.len());
    for &kind in &config.functions.enabled {
        let table = build_table(kind, &services)?;
        tracing::info!(
            function = %kind,
            mount_path = kind.mount_path(),
            routes = table.len(),
            "Function ready"
        );
        let dispatcher = Dispatcher::new(Arc::new(table)).with_cors(cors.clone());
        functions.push(Function::new(kind, dispatcher));
    }
    Ok(functions)
}
