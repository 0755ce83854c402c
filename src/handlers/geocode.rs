//! Forward geocoding through a Nominatim-compatible service.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::GeocoderConfig;
use crate::dispatch::HandlerError;
use crate::handlers::read_json;
use crate::http::request::query_pairs;
use crate::http::response::ResponseSink;

/// Query keys accepted as the address to look up, in priority order.
const ADDRESS_KEYS: [&str; 3] = ["q", "address", "postcode"];

#[derive(Debug, Deserialize)]
struct GeocodeBody {
    #[serde(alias = "q", alias = "postcode")]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
}

pub struct Geocoder {
    http: reqwest::Client,
    search_url: Url,
    country_codes: Option<String>,
}

impl Geocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, HandlerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let search_url = Url::parse(&base)
            .and_then(|base| base.join("search"))
            .map_err(|e| HandlerError::msg(format!("invalid geocoder URL {base:?}: {e}")))?;
        Ok(Self {
            http,
            search_url,
            country_codes: config.country_codes.clone(),
        })
    }

    /// Resolve an address to coordinates. `None` when nothing matched.
    pub async fn lookup(&self, address: &str) -> Result<Option<Location>, HandlerError> {
        let mut query = vec![("q", address), ("format", "json"), ("limit", "1")];
        if let Some(codes) = &self.country_codes {
            query.push(("countrycodes", codes.as_str()));
        }
        let response = self
            .http
            .get(self.search_url.clone())
            .query(&query)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(HandlerError::UpstreamStatus(response.status()));
        }
        let hits: Vec<SearchHit> = response.json().await?;
        Ok(hits.into_iter().next().and_then(|hit| {
            Some(Location {
                lat: hit.lat.parse().ok()?,
                lng: hit.lon.parse().ok()?,
                display_name: hit.display_name,
            })
        }))
    }

    async fn address(request: Request<Body>) -> Result<Result<String, String>, HandlerError> {
        if request.method() == Method::POST {
            return Ok(match read_json::<GeocodeBody>(request).await? {
                Ok(GeocodeBody { address: Some(a) }) if !a.trim().is_empty() => Ok(a),
                Ok(_) => Err("address is required".to_string()),
                Err(err) => Err(format!("Invalid request body: {err}")),
            });
        }
        let pairs = query_pairs(&request);
        let address = ADDRESS_KEYS.iter().find_map(|key| {
            pairs
                .iter()
                .find(|(k, v)| k == key && !v.trim().is_empty())
                .map(|(_, v)| v.clone())
        });
        Ok(address.ok_or_else(|| "address is required".to_string()))
    }

    /// `GET /api/geocode?q=...` and `POST /api/geocode`
    pub async fn handle(&self, request: Request<Body>, response: ResponseSink) -> Result<(), HandlerError> {
        let address = match Self::address(request).await? {
            Ok(address) => address,
            Err(message) => {
                response.error(StatusCode::BAD_REQUEST, &message)?;
                return Ok(());
            }
        };

        match self.lookup(address.trim()).await? {
            Some(location) => {
                response.insert_header(
                    header::CACHE_CONTROL,
                    header::HeaderValue::from_static("public, max-age=86400"),
                )?;
                response.json(StatusCode::OK, &location)?;
            }
            None => response.error(StatusCode::NOT_FOUND, "Location not found")?,
        }
        Ok(())
    }
}
