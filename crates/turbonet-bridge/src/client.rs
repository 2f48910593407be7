//! HTTP adapter for the TurboNET API.
//!
//! One request per command invocation, a fixed timeout, no retries. The
//! status code is returned as-is; deciding what a non-200 means is the
//! caller's job.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use turbonet_types::api::{ApiMethod, ApiRequest, ApiResponse};
use turbonet_types::config::BridgeConfig;
use turbonet_types::error::{TurboNetError, TurboNetResult};

/// Something that can carry an [`ApiRequest`] to the API.
///
/// The router only depends on this trait so the command pipeline can run
/// against an in-process transport.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Perform the request. Fails only on transport-level problems.
    async fn call(&self, request: ApiRequest) -> TurboNetResult<ApiResponse>;
}

/// reqwest-backed API client bound to one base URL.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for `base_url` with the given per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TurboNetResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TurboNetError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a client from validated bridge configuration.
    pub fn from_config(config: &BridgeConfig) -> TurboNetResult<Self> {
        Self::new(config.api_base.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ApiTransport for ApiClient {
    async fn call(&self, request: ApiRequest) -> TurboNetResult<ApiResponse> {
        let url = self.url_for(&request.path);
        let mut builder = match request.method {
            ApiMethod::Get => self.client.get(&url),
            ApiMethod::Post => self.client.post(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!(method = %request.method, path = %request.path, "Calling TurboNET API");
        let transport_err = |e: reqwest::Error| {
            warn!(path = %request.path, "TurboNET request failed: {e}");
            TurboNetError::Transport {
                endpoint: request.path.clone(),
                reason: e.to_string(),
            }
        };

        let resp = builder.send().await.map_err(transport_err)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(transport_err)?;
        if status != 200 {
            debug!(path = %request.path, status, "TurboNET API returned non-200");
        }
        Ok(ApiResponse::new(status, body))
    }
}
