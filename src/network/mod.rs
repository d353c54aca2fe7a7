//! The Fetch primitive the worker's strategies sit on.
//!
//! Strategies only see the [`Network`] trait, so the origin client
//! ([`HttpNetwork`]) can be swapped for a scripted fake in tests.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod client;
mod request;

pub use client::HttpNetwork;
pub use request::{Destination, FetchRequest, RequestMode};

use crate::cache::StoredResponse;
use async_trait::async_trait;
use thiserror::Error;

/// A fetch that never produced a response.
///
/// A response with an error status is *not* a `NetworkError`; it is returned
/// as a normal [`StoredResponse`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("fetch failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::Timeout(e.to_string())
        } else if e.is_connect() {
            NetworkError::Connect(e.to_string())
        } else if e.is_builder() {
            NetworkError::InvalidRequest(e.to_string())
        } else {
            NetworkError::Other(e.to_string())
        }
    }
}

#[async_trait]
pub trait Network: Send + Sync {
    /// Perform one round-trip for `request`.
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, NetworkError>;
}
