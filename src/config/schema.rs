//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! function host. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

use crate::functions::FunctionKind;
use crate::security::cors::{DEFAULT_ALLOW_HEADERS, DEFAULT_ALLOW_METHODS, DEFAULT_ALLOW_ORIGIN};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Cross-origin headers stamped on every response.
    pub cors: CorsConfig,

    /// WordPress/WooCommerce content source.
    pub upstream: UpstreamConfig,

    /// Geocoding service.
    pub geocoder: GeocoderConfig,

    /// Payment calculator defaults.
    pub financing: FinancingConfig,

    /// Deployable units to serve.
    pub functions: FunctionsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Invocation timeout in seconds, enforced by the hosting layer.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 10,
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// CORS header values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: DEFAULT_ALLOW_ORIGIN.to_string(),
            allow_methods: DEFAULT_ALLOW_METHODS.to_string(),
            allow_headers: DEFAULT_ALLOW_HEADERS.to_string(),
        }
    }
}

/// WordPress/WooCommerce upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Site root, e.g. "https://cars.example.com/".
    pub base_url: String,

    /// WooCommerce REST consumer key.
    pub consumer_key: Option<String>,

    /// WooCommerce REST consumer secret.
    pub consumer_secret: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// How long catalog responses stay cached, in seconds. 0 disables caching.
    pub cache_ttl_secs: u64,

    /// Page size requested from WooCommerce.
    pub per_page: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            consumer_key: None,
            consumer_secret: None,
            timeout_secs: 8,
            cache_ttl_secs: 300,
            per_page: 50,
        }
    }
}

/// Nominatim-compatible geocoder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,

    /// User-Agent sent upstream (Nominatim requires one).
    pub user_agent: String,

    /// Optional comma-separated ISO country codes to restrict results.
    pub country_codes: Option<String>,

    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org/".to_string(),
            user_agent: concat!("vehicle-api/", env!("CARGO_PKG_VERSION")).to_string(),
            country_codes: None,
            timeout_secs: 5,
        }
    }
}

/// Payment calculator defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FinancingConfig {
    /// APR used when the request omits one, in percent.
    pub default_apr_percent: f64,

    /// Term used when the request omits one, in months.
    pub default_term_months: u32,

    /// Terms a request may ask for. Empty allows any term up to `max_term_months`.
    pub allowed_terms: Vec<u32>,

    pub max_term_months: u32,

    /// Upper bound accepted for APR, in percent.
    pub max_apr_percent: f64,
}

impl Default for FinancingConfig {
    fn default() -> Self {
        Self {
            default_apr_percent: 6.9,
            default_term_months: 60,
            allowed_terms: vec![24, 36, 48, 60, 72, 84],
            max_term_months: 96,
            max_apr_percent: 36.0,
        }
    }
}

/// Which deployable units this process serves.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FunctionsConfig {
    pub enabled: Vec<FunctionKind>,
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            enabled: FunctionKind::ALL.to_vec(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "vehicle_api=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
