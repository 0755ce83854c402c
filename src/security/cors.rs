//! Cross-origin response headers.
//!
//! # Responsibilities
//! - Hold the allow-origin, allow-methods and allow-headers values
//! - Stamp them onto every response before routing runs
//!
//! # Design Decisions
//! - Values are validated once when the policy is built
//! - Applying the policy is infallible and has no other side effects

use axum::http::header::{
    InvalidHeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue};

use crate::config::CorsConfig;

pub const DEFAULT_ALLOW_ORIGIN: &str = "*";
pub const DEFAULT_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const DEFAULT_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// CORS headers applied to every response a dispatcher writes.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static(DEFAULT_ALLOW_ORIGIN),
            allow_methods: HeaderValue::from_static(DEFAULT_ALLOW_METHODS),
            allow_headers: HeaderValue::from_static(DEFAULT_ALLOW_HEADERS),
        }
    }
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(&config.allow_origin)?,
            allow_methods: HeaderValue::from_str(&config.allow_methods)?,
            allow_headers: HeaderValue::from_str(&config.allow_headers)?,
        })
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }

    /// A fresh header map carrying only the CORS headers.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(3);
        self.apply(&mut headers);
        headers
    }
}
