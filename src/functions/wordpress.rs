//! `wordpress` function: connectivity checks against the content source.

use axum::http::Method;

use crate::dispatch::HandlerRef;
use crate::handlers::{health, service_handler, Services};
use crate::routing::{RouteTable, RouteTableError};

pub const NAME: &str = "wordpress";
pub const MOUNT_PATH: &str = "/api/wordpress";

pub struct WordPressHandlers {
    pub test: HandlerRef,
    pub health: HandlerRef,
}

impl WordPressHandlers {
    pub fn from_services(services: &Services) -> Self {
        Self {
            test: service_handler(services.wordpress.clone(), |probe, req, res| async move {
                probe.handle_test(req, res).await
            }),
            health: health(NAME),
        }
    }
}

pub fn routes(handlers: WordPressHandlers) -> Result<RouteTable, RouteTableError> {
    RouteTable::builder(NAME)
        .exact(Method::GET, "/api/wordpress/test", handlers.test)
        .exact(Method::GET, "/api/wordpress/health", handlers.health)
        .build()
}
