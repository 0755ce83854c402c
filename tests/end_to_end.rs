//! Full stack over a real listener: hosting layer, dispatchers, handlers and
//! mocked upstream services.

mod common;

use std::net::SocketAddr;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use common::{start_mock_geocoder, start_mock_wordpress};
use vehicle_api::config::{AppConfig, GeocoderConfig, UpstreamConfig};
use vehicle_api::lifecycle::{build_functions, Shutdown};
use vehicle_api::security::CorsPolicy;
use vehicle_api::HttpServer;

struct TestServer {
    base: String,
    shutdown: Shutdown,
    task: JoinHandle<Result<(), std::io::Error>>,
}

async fn start_server(wordpress: SocketAddr, geocoder: SocketAddr) -> TestServer {
    let config = AppConfig {
        upstream: UpstreamConfig {
            base_url: format!("http://{wordpress}/"),
            consumer_key: Some("ck_test".into()),
            consumer_secret: Some("cs_test".into()),
            ..UpstreamConfig::default()
        },
        geocoder: GeocoderConfig {
            base_url: format!("http://{geocoder}"),
            ..GeocoderConfig::default()
        },
        ..AppConfig::default()
    };

    let functions = build_functions(&config).unwrap();
    let server = HttpServer::new(config.listener.clone(), &functions, CorsPolicy::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let task = tokio::spawn(server.run(listener, receiver));
    TestServer {
        base: format!("http://{addr}"),
        shutdown,
        task,
    }
}

async fn get_json(client: &reqwest::Client, url: String) -> (u16, Value) {
    let response = client.get(url).send().await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_full_stack() {
    let wordpress = start_mock_wordpress().await;
    let geocoder = start_mock_geocoder().await;
    let server = start_server(wordpress, geocoder).await;
    let client = reqwest::Client::new();
    let base = &server.base;

    // Vehicles
    let (status, body) = get_json(&client, format!("{base}/api/vehicles")).await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 2);
    assert_eq!(body["page"], 1);

    let (_, body) = get_json(&client, format!("{base}/api/vehicles?make=audi")).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["vehicles"][0]["title"], "2020 Audi A3");

    let (status, body) = get_json(&client, format!("{base}/api/vehicles/42")).await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "2019 Ford Focus");
    assert_eq!(body["make"], "Ford");
    assert_eq!(body["fuelType"], "Petrol");
    assert_eq!(body["price"], 18995.0);

    let (status, body) = get_json(&client, format!("{base}/api/vehicles/2020-audi-a3")).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], 43);

    let (status, body) = get_json(&client, format!("{base}/api/vehicles/999")).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({"error": "Vehicle not found"}));

    let (status, body) = get_json(&client, format!("{base}/api/vehicles/filters")).await;
    assert_eq!(status, 200);
    assert_eq!(body["makes"], json!(["Audi", "Ford"]));

    let response = client
        .delete(format!("{base}/api/vehicles/cache"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["cleared"].as_u64().unwrap() >= 4);

    // Payments
    let response = client
        .post(format!("{base}/api/payments/calculate"))
        .json(&json!({"price": 20000, "apr": 6, "termMonths": 60}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["monthlyPayment"], 386.66);

    let response = client
        .post(format!("{base}/api/payments/calculate"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Geocode
    let (status, body) = get_json(&client, format!("{base}/api/geocode?q=Leeds")).await;
    assert_eq!(status, 200);
    assert_eq!(body["displayName"], "Leeds, England");

    let (status, _) = get_json(&client, format!("{base}/api/geocode?q=Atlantis")).await;
    assert_eq!(status, 404);

    // WordPress
    let (status, body) = get_json(&client, format!("{base}/api/wordpress/test")).await;
    assert_eq!(status, 200);
    assert_eq!(body["connected"], true);
    assert_eq!(body["woocommerce"], true);
    assert_eq!(body["siteName"], "Example Cars");

    // Core envelopes
    let (status, body) = get_json(&client, format!("{base}/api/nonexistent")).await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({"error": "Not found"}));

    let response = client
        .request(reqwest::Method::OPTIONS, format!("{base}/api/payments/calculate"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response.bytes().await.unwrap().is_empty());

    server.shutdown.trigger();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unreachable_upstream() {
    let geocoder = start_mock_geocoder().await;
    // Bind and drop to get a port nothing listens on.
    let closed = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let server = start_server(closed, geocoder).await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, format!("{}/api/vehicles", server.base)).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Internal server error"}));

    let (status, body) = get_json(&client, format!("{}/api/wordpress/test", server.base)).await;
    assert_eq!(status, 502);
    assert_eq!(body["connected"], false);

    server.shutdown.trigger();
    server.task.await.unwrap().unwrap();
}
