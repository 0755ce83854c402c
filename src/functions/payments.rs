//! `payments` function: monthly payment quotes.

use axum::http::Method;

use crate::dispatch::HandlerRef;
use crate::handlers::{service_handler, Services};
use crate::routing::{RouteTable, RouteTableError};

pub const NAME: &str = "payments";
pub const MOUNT_PATH: &str = "/api/payments";

pub struct PaymentHandlers {
    pub calculate: HandlerRef,
}

impl PaymentHandlers {
    pub fn from_services(services: &Services) -> Self {
        Self {
            calculate: service_handler(services.calculator.clone(), |calc, req, res| async move {
                calc.calculate(req, res).await
            }),
        }
    }
}

pub fn routes(handlers: PaymentHandlers) -> Result<RouteTable, RouteTableError> {
    RouteTable::builder(NAME)
        .exact(Method::POST, "/api/payments/calculate", handlers.calculate)
        .build()
}
