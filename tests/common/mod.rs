//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, Query};
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use vehicle_api::dispatch::{handler_fn, HandlerError, HandlerRef};
use vehicle_api::functions::{geocode, payments, vehicles, wordpress, FunctionKind};
use vehicle_api::handlers::catalog::VEHICLE_ID_PARAM;
use vehicle_api::http::PathParamExt;
use vehicle_api::routing::RouteTable;

/// One handler invocation: the route label and the bound `id`, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub label: &'static str,
    pub param: Option<String>,
}

/// Stub handlers that record every call and answer `{"route": label}`.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn handler(&self, label: &'static str) -> HandlerRef {
        let calls = self.calls.clone();
        handler_fn(move |request, response| {
            let calls = calls.clone();
            async move {
                calls.lock().unwrap().push(Call {
                    label,
                    param: request.path_param(VEHICLE_ID_PARAM).map(str::to_string),
                });
                response.json(StatusCode::OK, &json!({ "route": label }))?;
                Ok(())
            }
        })
    }

    /// A handler that records the call, then fails with `message`.
    pub fn failing(&self, label: &'static str, message: &'static str) -> HandlerRef {
        let calls = self.calls.clone();
        handler_fn(move |_request, _response| {
            let calls = calls.clone();
            async move {
                calls.lock().unwrap().push(Call { label, param: None });
                Err(HandlerError::msg(message))
            }
        })
    }

    /// The production route table of `kind`, wired to recording stubs.
    pub fn table(&self, kind: FunctionKind) -> RouteTable {
        let table = match kind {
            FunctionKind::Payments => payments::routes(payments::PaymentHandlers {
                calculate: self.handler("payments.calculate"),
            }),
            FunctionKind::Vehicles => vehicles::routes(vehicles::VehicleHandlers {
                list: self.handler("vehicles.list"),
                filters: self.handler("vehicles.filters"),
                health: self.handler("vehicles.health"),
                clear_cache: self.handler("vehicles.clear_cache"),
                detail: self.handler("vehicles.detail"),
            }),
            FunctionKind::Geocode => geocode::routes(geocode::GeocodeHandlers {
                lookup: self.handler("geocode.lookup"),
                health: self.handler("geocode.health"),
            }),
            FunctionKind::Wordpress => wordpress::routes(wordpress::WordPressHandlers {
                test: self.handler("wordpress.test"),
                health: self.handler("wordpress.health"),
            }),
        };
        table.unwrap()
    }
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Serve `app` on an ephemeral local port.
pub async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn product(id: u64, name: &str, slug: &str, make: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "slug": slug,
        "permalink": format!("https://cars.example.com/vehicle/{slug}/"),
        "price": "18995",
        "regular_price": "18995",
        "sale_price": "",
        "stock_status": "instock",
        "short_description": "",
        "images": [{"src": format!("https://cars.example.com/{slug}.jpg")}],
        "attributes": [
            {"name": "Make", "options": [make]},
            {"name": "Fuel Type", "options": ["Petrol"]},
        ],
    })
}

fn products() -> Vec<Value> {
    vec![
        product(42, "2019 Ford Focus", "2019-ford-focus", "Ford"),
        product(43, "2020 Audi A3", "2020-audi-a3", "Audi"),
    ]
}

/// A WordPress site with WooCommerce serving two products.
pub async fn start_mock_wordpress() -> SocketAddr {
    let app = Router::new()
        .route(
            "/wp-json/",
            get(|| async {
                Json(json!({
                    "name": "Example Cars",
                    "description": "Used cars",
                    "url": "https://cars.example.com",
                    "namespaces": ["wp/v2", "wc/v3"],
                }))
            }),
        )
        .route(
            "/wp-json/wc/v3/products",
            get(|Query(query): Query<Vec<(String, String)>>| async move {
                let slug = query.iter().find(|(k, _)| k == "slug").map(|(_, v)| v.clone());
                let found: Vec<Value> = products()
                    .into_iter()
                    .filter(|p| slug.as_deref().map_or(true, |s| p["slug"] == s))
                    .collect();
                Json(found)
            }),
        )
        .route(
            "/wp-json/wc/v3/products/{id}",
            get(|Path(id): Path<u64>| async move {
                match products().into_iter().find(|p| p["id"] == id) {
                    Some(found) => Json(found).into_response(),
                    None => (
                        StatusCode::NOT_FOUND,
                        Json(json!({"code": "woocommerce_rest_product_invalid_id"})),
                    )
                        .into_response(),
                }
            }),
        );
    spawn_app(app).await
}

/// A Nominatim-compatible geocoder that knows one place.
pub async fn start_mock_geocoder() -> SocketAddr {
    let app = Router::new().route(
        "/search",
        get(|Query(query): Query<Vec<(String, String)>>| async move {
            let q = query.iter().find(|(k, _)| k == "q").map(|(_, v)| v.as_str());
            if q == Some("Leeds") {
                Json(json!([{"lat": "53.7974", "lon": "-1.5438", "display_name": "Leeds, England"}]))
            } else {
                Json(json!([]))
            }
        }),
    );
    spawn_app(app).await
}
