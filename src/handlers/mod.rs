//! Business-logic handlers behind the function route tables.
//!
//! These are the collaborators the dispatcher invokes. Each one writes its
//! own response through the sink and returns `Err` only for failures the
//! error boundary should turn into a 500.

pub mod catalog;
pub mod geocode;
pub mod payments;
pub mod upstream;
pub mod wordpress;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::dispatch::{handler_fn, HandlerError, HandlerRef};
use crate::http::response::ResponseSink;

pub use catalog::VehicleCatalog;
pub use geocode::Geocoder;
pub use payments::PaymentCalculator;
pub use upstream::WordPressClient;
pub use wordpress::WordPressProbe;

/// Largest JSON body a handler reads.
pub const MAX_JSON_BODY: usize = 64 * 1024;

/// Read the request body as JSON.
///
/// The outer error is a transport failure; the inner one a malformed body
/// the handler should answer with a 400.
pub async fn read_json<T>(request: Request<Body>) -> Result<Result<T, serde_json::Error>, HandlerError>
where
    T: DeserializeOwned,
{
    let bytes = axum::body::to_bytes(request.into_body(), MAX_JSON_BODY).await?;
    Ok(serde_json::from_slice(&bytes))
}

/// Bind a shared service into a handler; `f` gets its own `Arc` per call.
pub fn service_handler<S, F, Fut>(service: Arc<S>, f: F) -> HandlerRef
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, Request<Body>, ResponseSink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    handler_fn(move |request, response| f(service.clone(), request, response))
}

/// Liveness endpoint reporting the function name.
pub fn health(function: &'static str) -> HandlerRef {
    handler_fn(move |_request, response| async move {
        response.json(
            StatusCode::OK,
            &serde_json::json!({ "status": "ok", "function": function }),
        )?;
        Ok(())
    })
}

/// Every collaborator the functions need, built once at startup.
#[derive(Clone)]
pub struct Services {
    pub calculator: Arc<PaymentCalculator>,
    pub catalog: Arc<VehicleCatalog>,
    pub geocoder: Arc<Geocoder>,
    pub wordpress: Arc<WordPressProbe>,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self, HandlerError> {
        let client = WordPressClient::new(&config.upstream)?;
        Ok(Self {
            calculator: Arc::new(PaymentCalculator::new(config.financing.clone())),
            catalog: Arc::new(VehicleCatalog::new(
                client.clone(),
                Duration::from_secs(config.upstream.cache_ttl_secs),
                config.upstream.per_page,
            )),
            geocoder: Arc::new(Geocoder::new(&config.geocoder)?),
            wordpress: Arc::new(WordPressProbe::new(client)),
        })
    }
}
