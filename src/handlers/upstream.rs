//! HTTP client for the WordPress/WooCommerce content source.

use std::time::Duration;

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::UpstreamConfig;
use crate::dispatch::HandlerError;

/// Path of the WooCommerce REST namespace under the site root.
pub const WC_API_PATH: &str = "wp-json/wc/v3/";

/// Result of a GET against the content source.
#[derive(Debug)]
pub enum Fetched<T> {
    Found(T),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct WordPressClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<(String, String)>,
}

impl WordPressClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, HandlerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Self::with_client(http, config)
    }

    pub fn with_client(http: reqwest::Client, config: &UpstreamConfig) -> Result<Self, HandlerError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| HandlerError::msg(format!("invalid upstream base URL {base:?}: {e}")))?;
        let credentials = config
            .consumer_key
            .clone()
            .zip(config.consumer_secret.clone());
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, HandlerError> {
        self.base_url
            .join(path)
            .map_err(|e| HandlerError::msg(format!("invalid upstream path {path:?}: {e}")))
    }

    /// GET a WooCommerce resource, e.g. `products/12`.
    pub async fn wc_get<T>(&self, resource: &str, query: &[(String, String)]) -> Result<Fetched<T>, HandlerError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(&format!("{WC_API_PATH}{resource}"))?;
        let mut request = self.http.get(url).query(query);
        if let Some((key, secret)) = &self.credentials {
            request = request.basic_auth(key, Some(secret));
        }
        Self::decode(request.send().await?).await
    }

    /// GET the `wp-json` index of the site.
    pub async fn site_index<T>(&self) -> Result<Fetched<T>, HandlerError>
    where
        T: DeserializeOwned,
    {
        let url = self.url("wp-json/")?;
        Self::decode(self.http.get(url).send().await?).await
    }

    async fn decode<T>(response: reqwest::Response) -> Result<Fetched<T>, HandlerError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Fetched::NotFound);
        }
        if !status.is_success() {
            return Err(HandlerError::UpstreamStatus(status));
        }
        Ok(Fetched::Found(response.json().await?))
    }
}
