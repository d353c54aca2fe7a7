// Outbound request model seen by fetch handlers
// Author: kelexine (https://github.com/kelexine)

use crate::cache::CacheKey;
use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
use bytes::Bytes;

/// What the browser intends to do with the response (`Sec-Fetch-Dest`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Font,
    Manifest,
    Empty,
    Other,
}

impl Destination {
    pub fn from_header(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "document" | "iframe" | "frame" => Destination::Document,
            "image" => Destination::Image,
            "script" | "worker" | "sharedworker" | "serviceworker" => Destination::Script,
            "style" => Destination::Style,
            "font" => Destination::Font,
            "manifest" => Destination::Manifest,
            "empty" | "" => Destination::Empty,
            _ => Destination::Other,
        }
    }
}

/// Request mode (`Sec-Fetch-Mode`); only navigation matters to the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Other,
}

/// A request as intercepted by the worker.
///
/// `url` is the origin-relative path and query, which is also the URL half
/// of the cache key.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub destination: Destination,
    pub mode: RequestMode,
}

impl FetchRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            destination: Destination::Empty,
            mode: RequestMode::Other,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Build from an incoming HTTP request, reading destination and mode
    /// from the `Sec-Fetch-*` headers browsers attach.
    pub fn from_parts(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        let url = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let destination = headers
            .get("sec-fetch-dest")
            .and_then(|v| v.to_str().ok())
            .map(Destination::from_header)
            .unwrap_or(Destination::Empty);

        let mode = match headers.get("sec-fetch-mode").and_then(|v| v.to_str().ok()) {
            Some(m) if m.eq_ignore_ascii_case("navigate") => RequestMode::Navigate,
            _ => RequestMode::Other,
        };

        Self {
            method,
            url,
            headers,
            body,
            destination,
            mode,
        }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_header(mut self, name: header::HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Path component, without the query string
    pub fn path(&self) -> &str {
        self.url.split(['?', '#']).next().unwrap_or("/")
    }

    pub fn accepts_html(&self) -> bool {
        self.headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("text/html"))
            .unwrap_or(false)
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.method.clone(), self.url.clone())
    }
}
