//! Deployable units and their route tables.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     AppConfig.functions.enabled
//!     → build_table(kind, services) per function
//!     → RouteTable (validated, immutable)
//!     → Dispatcher (shared via Arc)
//!     → mounted by http::server under the function's mount paths
//! ```
//!
//! # Design Decisions
//! - A function contributes only data: its name, mount paths and routes
//! - Handler references are passed in, so tests can swap them for stubs

pub mod geocode;
pub mod payments;
pub mod vehicles;
pub mod wordpress;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::Dispatcher;
use crate::handlers::Services;
use crate::routing::{RouteTable, RouteTableError};

/// Every deployable unit this crate knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Payments,
    Vehicles,
    Geocode,
    Wordpress,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 4] = [
        FunctionKind::Payments,
        FunctionKind::Vehicles,
        FunctionKind::Geocode,
        FunctionKind::Wordpress,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FunctionKind::Payments => "payments",
            FunctionKind::Vehicles => "vehicles",
            FunctionKind::Geocode => "geocode",
            FunctionKind::Wordpress => "wordpress",
        }
    }

    /// Path under which the hosting layer forwards requests to this function.
    pub fn mount_path(self) -> &'static str {
        match self {
            FunctionKind::Payments => payments::MOUNT_PATH,
            FunctionKind::Vehicles => vehicles::MOUNT_PATH,
            FunctionKind::Geocode => geocode::MOUNT_PATH,
            FunctionKind::Wordpress => wordpress::MOUNT_PATH,
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the route table of `kind` wired to the production handlers.
pub fn build_table(kind: FunctionKind, services: &Services) -> Result<RouteTable, RouteTableError> {
    match kind {
        FunctionKind::Payments => payments::routes(payments::PaymentHandlers::from_services(services)),
        FunctionKind::Vehicles => vehicles::routes(vehicles::VehicleHandlers::from_services(services)),
        FunctionKind::Geocode => geocode::routes(geocode::GeocodeHandlers::from_services(services)),
        FunctionKind::Wordpress => wordpress::routes(wordpress::WordPressHandlers::from_services(services)),
    }
}

/// A function ready to be mounted: its kind and dispatcher.
#[derive(Clone)]
pub struct Function {
    pub kind: FunctionKind,
    pub dispatcher: Arc<Dispatcher>,
}

impl Function {
    pub fn new(kind: FunctionKind, dispatcher: Dispatcher) -> Self {
        Self {
            kind,
            dispatcher: Arc::new(dispatcher),
        }
    }
}
