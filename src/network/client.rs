// Origin HTTP client implementing the Fetch primitive
// Author: kelexine (https://github.com/kelexine)

use super::{FetchRequest, Network, NetworkError};
use crate::cache::StoredResponse;
use crate::config::OriginConfig;
use crate::error::{Result, WorkerError};
use crate::metrics;
use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderName, Method};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

/// Headers that describe a single connection and must not be forwarded.
static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    header::HOST,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Fetches requests from the configured website origin.
pub struct HttpNetwork {
    http_client: Client,
    base_url: String,
}

impl HttpNetwork {
    pub fn new(config: &OriginConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .redirect(reqwest::redirect::Policy::none())
            .use_rustls_tls();

        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http_client = builder
            .build()
            .map_err(|e| WorkerError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
        let mut out = headers.clone();
        for name in HOP_BY_HOP.iter() {
            out.remove(name);
        }
        out.remove(header::CONTENT_LENGTH);
        out.remove("keep-alive");
        out
    }

    /// Headers sent to the origin. Cacheable GETs drop `Accept-Encoding`:
    /// entries are keyed by method and URL only, so every stored body must
    /// be the identity coding any client can read.
    fn outbound_headers(request: &FetchRequest) -> HeaderMap {
        let mut headers = Self::strip_hop_by_hop(&request.headers);
        if request.method == Method::GET {
            headers.remove(header::ACCEPT_ENCODING);
        }
        headers
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> std::result::Result<StoredResponse, NetworkError> {
        let url = format!("{}{}", self.base_url, request.url);
        debug!("Fetching {} {}", request.method, url);

        let started = Instant::now();
        let response = self
            .http_client
            .request(request.method.clone(), &url)
            .headers(Self::outbound_headers(request))
            .body(request.body.clone())
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                metrics::record_network(false, started.elapsed().as_secs_f64());
                return Err(NetworkError::from(e));
            }
        };

        let status = response.status();
        let headers = Self::strip_hop_by_hop(response.headers());
        let body = response.bytes().await?;
        metrics::record_network(true, started.elapsed().as_secs_f64());

        debug!("Origin answered {} for {}", status, request.url);

        Ok(StoredResponse {
            status,
            headers,
            body,
        })
    }
}
