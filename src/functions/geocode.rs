//! `geocode` function: address and postcode lookup.

use axum::http::Method;

use crate::dispatch::HandlerRef;
use crate::handlers::{health, service_handler, Services};
use crate::routing::{RouteTable, RouteTableError};

pub const NAME: &str = "geocode";
pub const MOUNT_PATH: &str = "/api/geocode";

pub struct GeocodeHandlers {
    pub lookup: HandlerRef,
    pub health: HandlerRef,
}

impl GeocodeHandlers {
    pub fn from_services(services: &Services) -> Self {
        Self {
            lookup: service_handler(services.geocoder.clone(), |geo, req, res| async move {
                geo.handle(req, res).await
            }),
            health: health(NAME),
        }
    }
}

pub fn routes(handlers: GeocodeHandlers) -> Result<RouteTable, RouteTableError> {
    RouteTable::builder(NAME)
        .exact(Method::GET, "/api/geocode", handlers.lookup.clone())
        .exact(Method::POST, "/api/geocode", handlers.lookup)
        .exact(Method::GET, "/api/geocode/health", handlers.health)
        .build()
}
