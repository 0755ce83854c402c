//! Dispatch behavior through the real function route tables.

mod common;

use std::sync::Arc;

use axum::http::{header, Method, StatusCode};
use tower::ServiceExt;

use common::{body_bytes, body_json, request, Call, Recorder};
use vehicle_api::config::ListenerConfig;
use vehicle_api::dispatch::{handler_fn, Dispatcher};
use vehicle_api::functions::{payments, Function, FunctionKind};
use vehicle_api::http::HttpServer;
use vehicle_api::observability::{FaultKind, MemoryOperatorLog};
use vehicle_api::routing::RouteTable;
use vehicle_api::security::CorsPolicy;

fn dispatcher(recorder: &Recorder, kind: FunctionKind) -> Dispatcher {
    Dispatcher::new(Arc::new(recorder.table(kind)))
}

fn assert_cors(response: &axum::http::Response<axum::body::Body>) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization"
    );
}

#[tokio::test]
async fn test_every_declared_route_invokes_its_handler_once() {
    let cases = [
        (FunctionKind::Payments, "POST", "/api/payments/calculate", "payments.calculate"),
        (FunctionKind::Vehicles, "GET", "/api/vehicles", "vehicles.list"),
        (FunctionKind::Vehicles, "GET", "/api/vehicles/filters", "vehicles.filters"),
        (FunctionKind::Vehicles, "GET", "/api/vehicles/health", "vehicles.health"),
        (FunctionKind::Vehicles, "DELETE", "/api/vehicles/cache", "vehicles.clear_cache"),
        (FunctionKind::Vehicles, "GET", "/api/vehicles/ford-focus", "vehicles.detail"),
        (FunctionKind::Geocode, "GET", "/api/geocode?q=Leeds", "geocode.lookup"),
        (FunctionKind::Geocode, "POST", "/api/geocode", "geocode.lookup"),
        (FunctionKind::Geocode, "GET", "/api/geocode/health", "geocode.health"),
        (FunctionKind::Wordpress, "GET", "/api/wordpress/test", "wordpress.test"),
        (FunctionKind::Wordpress, "GET", "/api/wordpress/health", "wordpress.health"),
    ];

    for (kind, method, uri, label) in cases {
        let recorder = Recorder::new();
        let response = dispatcher(&recorder, kind).dispatch(request(method, uri)).await;

        assert_eq!(response.status(), StatusCode::OK, "{method} {uri}");
        assert_cors(&response);
        assert_eq!(body_json(response).await["route"], label);
        let calls = recorder.calls();
        assert_eq!(calls.len(), 1, "{method} {uri}");
        assert_eq!(calls[0].label, label);
    }
}

#[tokio::test]
async fn test_vehicle_id_is_bound() {
    let recorder = Recorder::new();
    let response = dispatcher(&recorder, FunctionKind::Vehicles)
        .dispatch(request("GET", "/api/vehicles/123"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        recorder.calls(),
        vec![Call {
            label: "vehicles.detail",
            param: Some("123".into()),
        }]
    );
}

#[tokio::test]
async fn test_exact_routes_win_over_vehicle_id() {
    for (segment, label) in [
        ("filters", "vehicles.filters"),
        ("health", "vehicles.health"),
    ] {
        let recorder = Recorder::new();
        let uri = format!("/api/vehicles/{segment}?page=2");
        dispatcher(&recorder, FunctionKind::Vehicles)
            .dispatch(request("GET", &uri))
            .await;
        assert_eq!(recorder.calls(), vec![Call { label, param: None }]);
    }
}

#[tokio::test]
async fn test_reserved_segment_with_other_method_is_not_an_id() {
    // GET /api/vehicles/cache has no route; it must not reach the detail handler.
    let recorder = Recorder::new();
    let response = dispatcher(&recorder, FunctionKind::Vehicles)
        .dispatch(request("GET", "/api/vehicles/cache"))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn test_unmatched_requests_get_not_found_envelope() {
    let cases = [
        (FunctionKind::Payments, "GET", "/api/payments/calculate"),
        (FunctionKind::Payments, "POST", "/api/nonexistent"),
        (FunctionKind::Vehicles, "PUT", "/api/vehicles/42"),
        (FunctionKind::Vehicles, "GET", "/api/vehicles/"),
        (FunctionKind::Geocode, "DELETE", "/api/geocode"),
        (FunctionKind::Wordpress, "GET", "/api/wordpress"),
    ];

    for (kind, method, uri) in cases {
        let recorder = Recorder::new();
        let response = dispatcher(&recorder, kind).dispatch(request(method, uri)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
        assert_cors(&response);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_bytes(response).await, br#"{"error":"Not found"}"#);
        assert!(recorder.calls().is_empty());
    }
}

#[tokio::test]
async fn test_options_short_circuits_every_path() {
    for uri in [
        "/api/payments/calculate",
        "/api/vehicles/123",
        "/api/nonexistent?x=1",
    ] {
        let recorder = Recorder::new();
        let response = dispatcher(&recorder, FunctionKind::Vehicles)
            .dispatch(request("OPTIONS", uri))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        assert!(body_bytes(response).await.is_empty());
        assert!(recorder.calls().is_empty());
    }
}

#[tokio::test]
async fn test_failing_handler_gets_opaque_internal_error() {
    let recorder = Recorder::new();
    let table = payments::routes(payments::PaymentHandlers {
        calculate: recorder.failing("payments.calculate", "database password is hunter2"),
    })
    .unwrap();
    let log = Arc::new(MemoryOperatorLog::new());
    let dispatcher = Dispatcher::new(Arc::new(table)).with_operator_log(log.clone());

    let response = dispatcher
        .dispatch(request("POST", "/api/payments/calculate"))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    let body = body_bytes(response).await;
    assert_eq!(body, br#"{"error":"Internal server error"}"#);
    assert!(!String::from_utf8_lossy(&body).contains("hunter2"));

    let faults = log.faults();
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].kind, FaultKind::Error);
    assert_eq!(faults[0].function, "payments");
    assert_eq!(faults[0].method, Method::POST);
    assert_eq!(faults[0].path, "/api/payments/calculate");
    assert!(faults[0].message.contains("hunter2"));
    assert_eq!(recorder.calls().len(), 1);
}

#[tokio::test]
async fn test_failed_handler_headers_do_not_leak_into_500() {
    let table = RouteTable::builder("geocode")
        .exact(
            Method::GET,
            "/api/geocode",
            handler_fn(|_request, response| async move {
                response.insert_header(
                    header::CACHE_CONTROL,
                    header::HeaderValue::from_static("public, max-age=86400"),
                )?;
                response.insert_header(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    header::HeaderValue::from_static("https://evil.test"),
                )?;
                Err(vehicle_api::dispatch::HandlerError::msg("geocoder timed out"))
            }),
        )
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(Arc::new(table));

    let response = dispatcher.dispatch(request("GET", "/api/geocode?q=x")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    assert_eq!(response.headers().len(), 4);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert!(!response.headers().contains_key(header::CACHE_CONTROL));
    assert_eq!(body_bytes(response).await, br#"{"error":"Internal server error"}"#);
}

#[tokio::test]
async fn test_panicking_handler_is_contained() {
    let table = RouteTable::builder("payments")
        .exact(
            Method::POST,
            "/api/payments/calculate",
            handler_fn(|request, _response| async move {
                if request.uri().path().is_empty() {
                    return Ok(());
                }
                panic!("division by zero in amortization");
            }),
        )
        .build()
        .unwrap();
    let log = Arc::new(MemoryOperatorLog::new());
    let dispatcher = Dispatcher::new(Arc::new(table)).with_operator_log(log.clone());

    let response = dispatcher
        .dispatch(request("POST", "/api/payments/calculate"))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, br#"{"error":"Internal server error"}"#);
    assert_eq!(log.faults()[0].kind, FaultKind::Panic);
    assert!(log.faults()[0].message.contains("division by zero"));
}

#[tokio::test]
async fn test_repeated_dispatch_is_byte_identical() {
    let recorder = Recorder::new();
    let dispatcher = dispatcher(&recorder, FunctionKind::Vehicles);

    for uri in ["/api/vehicles/123", "/api/vehicles/nope/", "/api/other"] {
        let first = dispatcher.dispatch(request("GET", uri)).await;
        let second = dispatcher.dispatch(request("GET", uri)).await;
        assert_eq!(first.status(), second.status());
        assert_eq!(first.headers(), second.headers());
        assert_eq!(body_bytes(first).await, body_bytes(second).await);
    }
}

#[tokio::test]
async fn test_concurrent_dispatch_shares_one_table() {
    let recorder = Recorder::new();
    let dispatcher = Arc::new(dispatcher(&recorder, FunctionKind::Vehicles));

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .dispatch(request("GET", &format!("/api/vehicles/{i}")))
                    .await
                    .status()
            })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(recorder.calls().len(), 32);
}

fn hosted(recorder: &Recorder) -> axum::Router {
    let functions: Vec<Function> = FunctionKind::ALL
        .into_iter()
        .map(|kind| Function::new(kind, dispatcher(recorder, kind)))
        .collect();
    HttpServer::build_router(&ListenerConfig::default(), &functions, CorsPolicy::default())
}

#[tokio::test]
async fn test_hosting_layer_routes_by_mount_path() {
    let recorder = Recorder::new();
    let app = hosted(&recorder);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/vehicles/123"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let response = app
        .clone()
        .oneshot(request("POST", "/api/payments/calculate"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["route"], "payments.calculate");

    assert_eq!(
        recorder.calls(),
        vec![
            Call {
                label: "vehicles.detail",
                param: Some("123".into()),
            },
            Call {
                label: "payments.calculate",
                param: None,
            },
        ]
    );
}

#[tokio::test]
async fn test_hosting_layer_unmounted_path_gets_envelope() {
    let recorder = Recorder::new();
    let app = hosted(&recorder);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/nonexistent"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors(&response);
    assert_eq!(body_bytes(response).await, br#"{"error":"Not found"}"#);

    let response = app.oneshot(request("OPTIONS", "/anything")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn test_hosting_layer_keeps_client_request_id() {
    let recorder = Recorder::new();
    let request = axum::http::Request::builder()
        .uri("/api/wordpress/health")
        .header("x-request-id", "req-123")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = hosted(&recorder).oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn test_hosting_layer_limits_body_before_dispatch() {
    let recorder = Recorder::new();
    let functions = vec![Function::new(
        FunctionKind::Payments,
        dispatcher(&recorder, FunctionKind::Payments),
    )];
    let config = ListenerConfig {
        max_body_bytes: 16,
        ..ListenerConfig::default()
    };
    let app = HttpServer::build_router(&config, &functions, CorsPolicy::default());

    let body = vec![b'x'; 64];
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/payments/calculate")
        .header(header::CONTENT_LENGTH, body.len())
        .body(axum::body::Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(recorder.calls().is_empty());
}
