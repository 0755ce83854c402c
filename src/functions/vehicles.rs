//! `vehicles` function: catalog listing, filters, detail and cache control.

use axum::http::Method;

use crate::dispatch::HandlerRef;
use crate::handlers::catalog::VEHICLE_ID_PARAM;
use crate::handlers::{service_handler, Services};
use crate::routing::{RouteTable, RouteTableError};

pub const NAME: &str = "vehicles";
pub const MOUNT_PATH: &str = "/api/vehicles";

/// Trailing segments under `/api/vehicles/` that are never vehicle ids.
pub const RESERVED_SEGMENTS: [&str; 3] = ["filters", "health", "cache"];

pub struct VehicleHandlers {
    pub list: HandlerRef,
    pub filters: HandlerRef,
    pub health: HandlerRef,
    pub clear_cache: HandlerRef,
    pub detail: HandlerRef,
}

impl VehicleHandlers {
    pub fn from_services(services: &Services) -> Self {
        let catalog = &services.catalog;
        Self {
            list: service_handler(catalog.clone(), |c, req, res| async move {
                c.handle_list(req, res).await
            }),
            filters: service_handler(catalog.clone(), |c, req, res| async move {
                c.handle_filters(req, res).await
            }),
            health: service_handler(catalog.clone(), |c, req, res| async move {
                c.handle_health(req, res).await
            }),
            clear_cache: service_handler(catalog.clone(), |c, req, res| async move {
                c.handle_clear_cache(req, res).await
            }),
            detail: service_handler(catalog.clone(), |c, req, res| async move {
                c.handle_detail(req, res).await
            }),
        }
    }
}

pub fn routes(handlers: VehicleHandlers) -> Result<RouteTable, RouteTableError> {
    RouteTable::builder(NAME)
        .exact(Method::GET, "/api/vehicles", handlers.list)
        .exact(Method::GET, "/api/vehicles/filters", handlers.filters)
        .exact(Method::GET, "/api/vehicles/health", handlers.health)
        .exact(Method::DELETE, "/api/vehicles/cache", handlers.clear_cache)
        .param(
            Method::GET,
            "/api/vehicles/",
            VEHICLE_ID_PARAM,
            RESERVED_SEGMENTS,
            handlers.detail,
        )
        .build()
}
