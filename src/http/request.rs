//! Request-side helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Derive the normalized path used for route matching
//! - Expose the path parameter bound by the matcher to handlers
//!
//! # Design Decisions
//! - The normalized path is the raw URL up to the first `?`
//! - No percent-decoding beyond what the HTTP stack already did
//! - Path parameters travel as a request extension, the original request
//!   is otherwise passed through untouched

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::matcher::PathParam;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values from random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read access to request data the dispatcher relies on.
pub trait RequestIdExt {
    /// The request ID header value, or `"unknown"`.
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Access to the trailing path parameter bound by a route.
pub trait PathParamExt {
    /// Value bound to `name`, if the matched route declared that parameter.
    fn path_param(&self, name: &str) -> Option<&str>;
}

impl<B> PathParamExt for Request<B> {
    fn path_param(&self, name: &str) -> Option<&str> {
        self.extensions()
            .get::<PathParam>()
            .filter(|param| param.name == name)
            .map(|param| param.value.as_str())
    }
}

/// The raw request URL as received: path plus optional query string.
pub fn raw_url<B>(request: &Request<B>) -> &str {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| request.uri().path())
}

/// Discard everything from the first `?` onward.
pub fn normalize_path(raw: &str) -> &str {
    match raw.split_once('?') {
        Some((path, _)) => path,
        None => raw,
    }
}

/// Decoded query-string pairs, in order.
pub fn query_pairs<B>(request: &Request<B>) -> Vec<(String, String)> {
    request
        .uri()
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}
