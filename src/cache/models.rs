//! Cache entry and partition naming models.

// Author: kelexine (https://github.com/kelexine)

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use std::fmt;

/// A response as stored in (or served from) a cache partition.
///
/// Bodies are held as `Bytes`, so cloning an entry to both store it and
/// return it never copies the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl StoredResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Whether this response may be written to a partition (2xx only).
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    /// The last-resort response when network, cache and offline document all miss.
    pub fn offline_unavailable() -> Self {
        let mut response = Self::new(StatusCode::SERVICE_UNAVAILABLE, "Offline");
        response.headers.insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

/// Request identity inside a partition: method plus URL (path and query).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: Method,
    pub url: String,
}

impl CacheKey {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// The role a partition plays in the caching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionRole {
    Static,
    Api,
    Image,
}

impl PartitionRole {
    pub const ALL: [PartitionRole; 3] = [PartitionRole::Static, PartitionRole::Api, PartitionRole::Image];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionRole::Static => "static",
            PartitionRole::Api => "api",
            PartitionRole::Image => "image",
        }
    }
}

/// The three partition names recognised by one worker version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNames {
    version: String,
}

impl PartitionNames {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `<role>-<version>`, e.g. `static-v1`.
    pub fn name(&self, role: PartitionRole) -> String {
        format!("{}-{}", role.as_str(), self.version)
    }

    pub fn all(&self) -> Vec<String> {
        PartitionRole::ALL.iter().map(|r| self.name(*r)).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        PartitionRole::ALL.iter().any(|r| self.name(*r) == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_names_embed_version() {
        let names = PartitionNames::new("v2");
        assert_eq!(names.name(PartitionRole::Static), "static-v2");
        assert_eq!(names.name(PartitionRole::Api), "api-v2");
        assert_eq!(names.name(PartitionRole::Image), "image-v2");
        assert!(names.contains("image-v2"));
        assert!(!names.contains("image-v1"));
    }

    #[test]
    fn test_only_success_statuses_are_storable() {
        assert!(StoredResponse::new(StatusCode::OK, "a").is_ok());
        assert!(StoredResponse::new(StatusCode::NO_CONTENT, "").is_ok());
        assert!(!StoredResponse::new(StatusCode::NOT_FOUND, "").is_ok());
        assert!(!StoredResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "").is_ok());
    }

    #[test]
    fn test_offline_unavailable_is_503() {
        let response = StoredResponse::offline_unavailable();
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body, Bytes::from_static(b"Offline"));
    }
}
