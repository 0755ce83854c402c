//! WordPress connectivity test.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde::{Deserialize, Serialize};

use crate::dispatch::HandlerError;
use crate::handlers::upstream::{Fetched, WordPressClient};
use crate::http::response::ResponseSink;

#[derive(Debug, Deserialize)]
struct SiteIndex {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    namespaces: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub connected: bool,
    pub upstream: String,
    pub latency_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    pub woocommerce: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

pub struct WordPressProbe {
    client: WordPressClient,
}

impl WordPressProbe {
    pub fn new(client: WordPressClient) -> Self {
        Self { client }
    }

    pub async fn probe(&self) -> ConnectionReport {
        let start = Instant::now();
        let result = self.client.site_index::<SiteIndex>().await;
        let mut report = ConnectionReport {
            connected: false,
            upstream: self.client.base_url().to_string(),
            latency_ms: start.elapsed().as_millis(),
            site_name: None,
            site_description: None,
            site_url: None,
            woocommerce: false,
            upstream_status: None,
        };

        match result {
            Ok(Fetched::Found(index)) => {
                report.connected = true;
                report.woocommerce = index.namespaces.iter().any(|ns| ns.starts_with("wc/"));
                report.site_name = Some(index.name);
                report.site_description = Some(index.description);
                report.site_url = Some(index.url);
            }
            Ok(Fetched::NotFound) => {
                report.upstream_status = Some(StatusCode::NOT_FOUND.as_u16());
            }
            Err(HandlerError::UpstreamStatus(status)) => {
                report.upstream_status = Some(status.as_u16());
            }
            Err(err) => {
                tracing::warn!(error = %err, upstream = %report.upstream, "WordPress unreachable");
            }
        }
        report
    }

    /// `GET /api/wordpress/test`
    pub async fn handle_test(&self, _request: Request<Body>, response: ResponseSink) -> Result<(), HandlerError> {
        let report = self.probe().await;
        let status = if report.connected {
            StatusCode::OK
        } else {
            StatusCode::BAD_GATEWAY
        };
        response.json(status, &report)?;
        Ok(())
    }
}
