//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{HttpMethod, Payload};
use reqwest::{header::HeaderMap, header::CONTENT_TYPE, Client};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Status, headers and raw body of one exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Distinct header names, lowercase
    pub fn header_names(&self) -> Vec<String> {
        self.headers.keys().map(|name| name.as_str().to_string()).collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client trait for the service under test
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue one request against a path relative to the base endpoint
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&Payload>,
    ) -> Result<RawResponse, HttpError>;

    async fn get(&self, path: &str) -> Result<RawResponse, HttpError> {
        self.request(HttpMethod::Get, path, None).await
    }

    async fn head(&self, path: &str) -> Result<RawResponse, HttpError> {
        self.request(HttpMethod::Head, path, None).await
    }

    async fn post(&self, path: &str, payload: &Payload) -> Result<RawResponse, HttpError> {
        self.request(HttpMethod::Post, path, Some(payload)).await
    }

    async fn put(&self, path: &str, payload: &Payload) -> Result<RawResponse, HttpError> {
        self.request(HttpMethod::Put, path, Some(payload)).await
    }

    async fn delete(&self, path: &str) -> Result<RawResponse, HttpError> {
        self.request(HttpMethod::Delete, path, None).await
    }

    /// Check once that the target answers `GET /` with 200
    async fn probe(&self) -> Result<(), HttpError> {
        let response = self.get("").await?;
        if response.status != 200 {
            return Err(HttpError::UnexpectedStatus {
                url: "/".to_string(),
                status: response.status,
            });
        }
        Ok(())
    }
}

/// Session-scoped client: one connection pool for the whole run
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base: Url,
    config: HttpConfig,
}

impl RestClient {
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        let mut endpoint = config.endpoint.trim().to_string();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let base = Url::parse(&endpoint)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        debug!(
            "Creating RestClient for {} with {}s timeout",
            base,
            config.timeout.as_secs()
        );
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .build()?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    pub fn url_for(&self, path: &str) -> Result<Url, HttpError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Ask the target to terminate. The service usually drops the
    /// connection instead of answering, so failures are only logged.
    pub async fn shutdown(&self) {
        match self.get("shutdown").await {
            Ok(response) => debug!("Shutdown request answered with {}", response.status),
            Err(e) => debug!("Shutdown request ended without response: {}", e),
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for RestClient {
    async fn probe(&self) -> Result<(), HttpError> {
        let url = self.base.to_string();
        info!("Probing target service at {}", url);
        let response = self.get("").await?;
        if response.status != 200 {
            return Err(HttpError::UnexpectedStatus {
                url,
                status: response.status,
            });
        }
        Ok(())
    }

    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&Payload>,
    ) -> Result<RawResponse, HttpError> {
        let url = self.url_for(path)?;
        let started = Instant::now();

        let mut request = self.client.request(method.into(), url.clone());
        if let Some(payload) = payload {
            if let Some(content_type) = payload.content_type() {
                request = request.header(CONTENT_TYPE, content_type);
            }
            request = request.body(payload.to_body()?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::from_transport(e, url.as_str()))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::from_transport(e, url.as_str()))?;

        debug!(
            "{} {} -> {} ({} bytes, {:?})",
            method,
            url,
            status,
            body.len(),
            started.elapsed()
        );
        if status >= 500 {
            warn!("{} {} answered with server error {}", method, url, status);
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
