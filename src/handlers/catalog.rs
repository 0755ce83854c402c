//! Vehicle catalog backed by WooCommerce products.
//!
//! # Responsibilities
//! - List vehicles with paging, search and attribute filters
//! - Derive filter facets (makes, models, years, ...) from the catalog
//! - Look up one vehicle by numeric id or slug
//! - Cache upstream results for a configurable TTL
//!
//! # Design Decisions
//! - Products are mapped to vehicles through their WooCommerce attributes
//! - Attribute filters are applied after mapping; WooCommerce only sees
//!   paging, search and price bounds
//! - Only successful lookups are cached

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dispatch::HandlerError;
use crate::handlers::upstream::{Fetched, WordPressClient};
use crate::http::request::{query_pairs, PathParamExt};
use crate::http::response::ResponseSink;

/// Name of the path parameter carrying a vehicle id or slug.
pub const VEHICLE_ID_PARAM: &str = "id";

const MAX_PER_PAGE: u32 = 100;

/// Upper bound on cached upstream responses.
pub const MAX_CACHE_ENTRIES: usize = 1024;

/// Query keys forwarded to WooCommerce as-is.
const PASSTHROUGH_KEYS: [&str; 6] = ["search", "category", "orderby", "order", "min_price", "max_price"];

/// Query keys matched against mapped vehicle attributes.
const ATTRIBUTE_KEYS: [&str; 5] = ["make", "model", "fuel_type", "transmission", "body_type"];

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub stock_status: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductImage {
    pub src: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductAttribute {
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub permalink: String,
    pub price: Option<f64>,
    pub regular_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub in_stock: bool,
    pub summary: String,
    pub images: Vec<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<u32>,
    pub mileage: Option<u32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
}

impl Vehicle {
    pub fn from_product(product: Product) -> Self {
        let mut attributes: BTreeMap<String, String> = BTreeMap::new();
        for attribute in product.attributes {
            if let Some(value) = attribute.options.into_iter().next() {
                attributes.insert(attribute_key(&attribute.name), value);
            }
        }

        Self {
            id: product.id,
            slug: product.slug,
            permalink: product.permalink,
            price: parse_price(&product.price),
            regular_price: parse_price(&product.regular_price),
            sale_price: parse_price(&product.sale_price),
            in_stock: product.stock_status == "instock",
            summary: product.short_description,
            images: product.images.into_iter().map(|image| image.src).collect(),
            make: pick(&attributes, &["make", "brand", "manufacturer"]),
            model: pick(&attributes, &["model"]),
            year: pick(&attributes, &["year", "model_year"]).and_then(|v| v.trim().parse().ok()),
            mileage: pick(&attributes, &["mileage", "odometer", "kilometers"]).and_then(|v| parse_number(&v)),
            fuel_type: pick(&attributes, &["fuel_type", "fuel"]),
            transmission: pick(&attributes, &["transmission", "gearbox"]),
            body_type: pick(&attributes, &["body_type", "body", "body_style"]),
            color: pick(&attributes, &["color", "colour"]),
            title: product.name,
        }
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        match key {
            "make" => self.make.as_deref(),
            "model" => self.model.as_deref(),
            "fuel_type" => self.fuel_type.as_deref(),
            "transmission" => self.transmission.as_deref(),
            "body_type" => self.body_type.as_deref(),
            _ => None,
        }
    }
}

fn pick(attributes: &BTreeMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| attributes.get(*key).cloned())
}

/// "Fuel Type" → "fuel_type"
fn attribute_key(name: &str) -> String {
    name.trim()
        .trim_start_matches("pa_")
        .to_lowercase()
        .replace([' ', '-'], "_")
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// "45,000 km" → 45000
fn parse_number(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Values available for each catalog filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub makes: BTreeSet<String>,
    pub models: BTreeSet<String>,
    pub years: BTreeSet<u32>,
    pub fuel_types: BTreeSet<String>,
    pub transmissions: BTreeSet<String>,
    pub body_types: BTreeSet<String>,
    pub price_range: Option<PriceRange>,
}

impl Facets {
    pub fn from_vehicles(vehicles: &[Vehicle]) -> Self {
        let mut facets = Facets::default();
        for vehicle in vehicles {
            facets.makes.extend(vehicle.make.clone());
            facets.models.extend(vehicle.model.clone());
            facets.years.extend(vehicle.year);
            facets.fuel_types.extend(vehicle.fuel_type.clone());
            facets.transmissions.extend(vehicle.transmission.clone());
            facets.body_types.extend(vehicle.body_type.clone());
            if let Some(price) = vehicle.price {
                facets.price_range = Some(match facets.price_range.take() {
                    Some(range) => PriceRange {
                        min: range.min.min(price),
                        max: range.max.max(price),
                    },
                    None => PriceRange {
                        min: price,
                        max: price,
                    },
                });
            }
        }
        facets
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VehiclePage {
    vehicles: Vec<Vehicle>,
    count: usize,
    page: u32,
    per_page: u32,
}

struct CacheEntry {
    stored_at: Instant,
    value: serde_json::Value,
}

pub struct VehicleCatalog {
    client: WordPressClient,
    ttl: Duration,
    per_page: u32,
    cache: DashMap<String, CacheEntry>,
}

impl VehicleCatalog {
    pub fn new(client: WordPressClient, ttl: Duration, per_page: u32) -> Self {
        Self {
            client,
            ttl,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            cache: DashMap::new(),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached entry, returning how many were removed.
    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.len();
        self.cache.clear();
        removed
    }

    /// Serve `key` from the cache, or await `fetch` and cache its result.
    async fn cached<T, Fut>(&self, key: String, fetch: Fut) -> Result<Option<T>, HandlerError>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<Option<T>, HandlerError>>,
    {
        if !self.ttl.is_zero() {
            let hit = self
                .cache
                .get(&key)
                .filter(|entry| entry.stored_at.elapsed() < self.ttl)
                .map(|entry| entry.value.clone());
            if let Some(value) = hit {
                tracing::debug!(key = %key, "Catalog cache hit");
                return Ok(Some(serde_json::from_value(value)?));
            }
        }

        let fetched = fetch.await?;
        if let (Some(value), false) = (&fetched, self.ttl.is_zero()) {
            self.store(key, serde_json::to_value(value)?);
        }
        Ok(fetched)
    }

    /// Insert after pruning expired entries, evicting the oldest when full.
    fn store(&self, key: String, value: serde_json::Value) {
        self.cache.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        if self.cache.len() >= MAX_CACHE_ENTRIES && !self.cache.contains_key(&key) {
            let oldest = self
                .cache
                .iter()
                .min_by_key(|entry| entry.stored_at)
                .map(|entry| entry.key().clone());
            if let Some(oldest) = oldest {
                self.cache.remove(&oldest);
            }
        }
        self.cache.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    async fn fetch_products(&self, query: Vec<(String, String)>) -> Result<Vec<Vehicle>, HandlerError> {
        match self.client.wc_get::<Vec<Product>>("products", &query).await? {
            Fetched::Found(products) => Ok(products.into_iter().map(Vehicle::from_product).collect()),
            Fetched::NotFound => Err(HandlerError::msg("WooCommerce products endpoint not found")),
        }
    }

    /// Vehicles for one page, filtered by attribute query keys.
    pub async fn list_vehicles(&self, query: &[(String, String)]) -> Result<(Vec<Vehicle>, u32, u32), HandlerError> {
        let lookup = |key: &str| query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

        let page = lookup("page").and_then(|p| p.parse().ok()).filter(|p| *p > 0).unwrap_or(1);
        let per_page = lookup("per_page")
            .and_then(|p| p.parse::<u32>().ok())
            .map(|p| p.clamp(1, MAX_PER_PAGE))
            .unwrap_or(self.per_page);

        let mut upstream: Vec<(String, String)> = query
            .iter()
            .filter(|(k, _)| PASSTHROUGH_KEYS.contains(&k.as_str()))
            .cloned()
            .collect();
        upstream.sort();
        upstream.push(("page".into(), page.to_string()));
        upstream.push(("per_page".into(), per_page.to_string()));
        upstream.push(("status".into(), "publish".into()));

        let key = format!(
            "list?{}",
            upstream
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&")
        );
        let vehicles = self
            .cached(key, async { self.fetch_products(upstream).await.map(Some) })
            .await?
            .unwrap_or_default();

        let filters: Vec<(&str, &str)> = ATTRIBUTE_KEYS
            .iter()
            .filter_map(|key| lookup(*key).map(|value| (*key, value)))
            .collect();
        let vehicles = vehicles
            .into_iter()
            .filter(|vehicle| {
                filters.iter().all(|(key, wanted)| {
                    vehicle
                        .attribute(key)
                        .is_some_and(|actual| actual.eq_ignore_ascii_case(wanted))
                })
            })
            .collect();
        Ok((vehicles, page, per_page))
    }

    pub async fn facets(&self) -> Result<Facets, HandlerError> {
        let query = vec![
            ("per_page".to_string(), MAX_PER_PAGE.to_string()),
            ("status".to_string(), "publish".to_string()),
        ];
        let facets = self
            .cached("filters".to_string(), async {
                let vehicles = self.fetch_products(query).await?;
                Ok(Some(Facets::from_vehicles(&vehicles)))
            })
            .await?;
        Ok(facets.unwrap_or_default())
    }

    /// Look up a vehicle by numeric id, or by slug otherwise.
    pub async fn vehicle(&self, id_or_slug: &str) -> Result<Option<Vehicle>, HandlerError> {
        self.cached(format!("vehicle:{id_or_slug}"), async {
            if id_or_slug.chars().all(|c| c.is_ascii_digit()) {
                let fetched = self
                    .client
                    .wc_get::<Product>(&format!("products/{id_or_slug}"), &[])
                    .await?;
                return Ok(match fetched {
                    Fetched::Found(product) => Some(Vehicle::from_product(product)),
                    Fetched::NotFound => None,
                });
            }
            let query = vec![("slug".to_string(), id_or_slug.to_string())];
            Ok(self.fetch_products(query).await?.into_iter().next())
        })
        .await
    }

    /// `GET /api/vehicles`
    pub async fn handle_list(&self, request: Request<Body>, response: ResponseSink) -> Result<(), HandlerError> {
        let query = query_pairs(&request);
        let (vehicles, page, per_page) = self.list_vehicles(&query).await?;
        response.json(
            StatusCode::OK,
            &VehiclePage {
                count: vehicles.len(),
                vehicles,
                page,
                per_page,
            },
        )?;
        Ok(())
    }

    /// `GET /api/vehicles/filters`
    pub async fn handle_filters(&self, _request: Request<Body>, response: ResponseSink) -> Result<(), HandlerError> {
        let facets = self.facets().await?;
        response.json(StatusCode::OK, &facets)?;
        Ok(())
    }

    /// `GET /api/vehicles/:id`
    pub async fn handle_detail(&self, request: Request<Body>, response: ResponseSink) -> Result<(), HandlerError> {
        let Some(id) = request.path_param(VEHICLE_ID_PARAM) else {
            return Err(HandlerError::msg("vehicle route invoked without an id"));
        };
        match self.vehicle(id).await? {
            Some(vehicle) => response.json(StatusCode::OK, &vehicle)?,
            None => response.error(StatusCode::NOT_FOUND, "Vehicle not found")?,
        }
        Ok(())
    }

    /// `DELETE /api/vehicles/cache`
    pub async fn handle_clear_cache(&self, _request: Request<Body>, response: ResponseSink) -> Result<(), HandlerError> {
        let cleared = self.clear_cache();
        tracing::info!(cleared, "Catalog cache cleared");
        response.json(StatusCode::OK, &serde_json::json!({ "cleared": cleared }))?;
        Ok(())
    }

    /// `GET /api/vehicles/health`
    pub async fn handle_health(&self, _request: Request<Body>, response: ResponseSink) -> Result<(), HandlerError> {
        response.json(
            StatusCode::OK,
            &serde_json::json!({
                "status": "ok",
                "function": "vehicles",
                "cachedEntries": self.cached_entries(),
                "upstream": self.client.base_url().as_str(),
            }),
        )?;
        Ok(())
    }
}
