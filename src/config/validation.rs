//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, terms, rates)
//! - Validate addresses, URLs and header values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field}: invalid URL {value:?}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: not a valid header value")]
    InvalidHeaderValue { field: &'static str },

    #[error("functions.enabled: at least one function must be enabled")]
    NoFunctions,

    #[error("functions.enabled: {0} listed more than once")]
    DuplicateFunction(String),

    #[error("financing: {0}")]
    Financing(String),

    #[error("upstream: consumer_key and consumer_secret must be set together")]
    PartialCredentials,
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_positive(&mut errors, "listener.request_timeout_secs", config.listener.request_timeout_secs);
    check_positive(&mut errors, "listener.max_body_bytes", config.listener.max_body_bytes as u64);

    for (field, value) in [
        ("cors.allow_origin", &config.cors.allow_origin),
        ("cors.allow_methods", &config.cors.allow_methods),
        ("cors.allow_headers", &config.cors.allow_headers),
    ] {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeaderValue { field });
        }
    }

    check_url(&mut errors, "upstream.base_url", &config.upstream.base_url);
    check_positive(&mut errors, "upstream.timeout_secs", config.upstream.timeout_secs);
    check_positive(&mut errors, "upstream.per_page", u64::from(config.upstream.per_page));
    if config.upstream.consumer_key.is_some() != config.upstream.consumer_secret.is_some() {
        errors.push(ValidationError::PartialCredentials);
    }

    check_url(&mut errors, "geocoder.base_url", &config.geocoder.base_url);
    check_positive(&mut errors, "geocoder.timeout_secs", config.geocoder.timeout_secs);
    if HeaderValue::from_str(&config.geocoder.user_agent).is_err() {
        errors.push(ValidationError::InvalidHeaderValue {
            field: "geocoder.user_agent",
        });
    }

    let financing = &config.financing;
    if !(0.0..=financing.max_apr_percent).contains(&financing.default_apr_percent) {
        errors.push(ValidationError::Financing(format!(
            "default_apr_percent {} outside 0..={}",
            financing.default_apr_percent, financing.max_apr_percent
        )));
    }
    if financing.default_term_months == 0 || financing.default_term_months > financing.max_term_months {
        errors.push(ValidationError::Financing(format!(
            "default_term_months {} outside 1..={}",
            financing.default_term_months, financing.max_term_months
        )));
    }
    if !financing.allowed_terms.is_empty() && !financing.allowed_terms.contains(&financing.default_term_months) {
        errors.push(ValidationError::Financing(format!(
            "default_term_months {} is not in allowed_terms",
            financing.default_term_months
        )));
    }

    if config.functions.enabled.is_empty() {
        errors.push(ValidationError::NoFunctions);
    }
    let mut seen = HashSet::new();
    for kind in &config.functions.enabled {
        if !seen.insert(*kind) {
            errors.push(ValidationError::DuplicateFunction(kind.name().to_string()));
        }
    }

    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::Zero { field });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}
