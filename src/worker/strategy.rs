// Caching strategies: cache-first, network-first, stale-while-revalidate
// Author: kelexine (https://github.com/kelexine)
//
// Network failures stop here. The fallback chain is always
// fresh network -> cached copy -> offline document -> synthetic 503;
// each strategy only decides whether the cache is consulted before or
// after the network.

use super::classify::Strategy;
use crate::cache::{CacheKey, CachePartition, CacheStorage, StoredResponse};
use crate::metrics;
use crate::network::{FetchRequest, Network, NetworkError};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Background refresh started by stale-while-revalidate.
///
/// Resolves with the revalidation fetch's result once the partition has
/// been updated (or left alone, for failures and non-ok responses).
pub type Revalidation = JoinHandle<Result<StoredResponse, NetworkError>>;

/// Where a worker response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    Offline,
    Synthetic,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::Offline => "offline",
            ResponseSource::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The response a fetch handler hands back to the host.
#[derive(Debug)]
pub struct FetchOutcome {
    pub response: StoredResponse,
    pub source: ResponseSource,
    /// Set when a cached response was served while a refresh runs on.
    pub revalidation: Option<Revalidation>,
}

impl FetchOutcome {
    fn new(response: StoredResponse, source: ResponseSource) -> Self {
        Self {
            response,
            source,
            revalidation: None,
        }
    }
}

/// Runs strategies against one network and one storage.
#[derive(Clone)]
pub struct Strategies {
    network: Arc<dyn Network>,
    storage: CacheStorage,
    offline_partition: String,
    offline_key: CacheKey,
}

impl Strategies {
    pub fn new(
        network: Arc<dyn Network>,
        storage: CacheStorage,
        offline_partition: String,
        offline_path: &str,
    ) -> Self {
        Self {
            network,
            storage,
            offline_partition,
            offline_key: CacheKey::get(offline_path),
        }
    }

    pub async fn run(
        &self,
        strategy: Strategy,
        request: &FetchRequest,
        partition: Arc<CachePartition>,
    ) -> FetchOutcome {
        match strategy {
            Strategy::CacheFirst => self.cache_first(request, &partition).await,
            Strategy::NetworkFirst => self.network_first(request, &partition).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request, partition).await,
        }
    }

    /// Serve from the partition; on a miss fetch once and store ok responses.
    pub async fn cache_first(&self, request: &FetchRequest, partition: &CachePartition) -> FetchOutcome {
        let key = request.cache_key();

        if let Some(cached) = partition.get(&key).await {
            debug!("{}: cache hit for {}", partition.name(), key);
            metrics::record_cache_hit(partition.name());
            return FetchOutcome::new(cached, ResponseSource::Cache);
        }

        metrics::record_cache_miss(partition.name());
        match fetch_and_store(self.network.as_ref(), partition, request).await {
            Ok(response) => FetchOutcome::new(response, ResponseSource::Network),
            Err(e) => {
                warn!("Network failed for {} after cache miss: {}", key, e);
                self.offline_fallback().await
            }
        }
    }

    /// Fetch first; fall back to the partition, then the offline chain.
    pub async fn network_first(&self, request: &FetchRequest, partition: &CachePartition) -> FetchOutcome {
        let key = request.cache_key();

        let error = match fetch_and_store(self.network.as_ref(), partition, request).await {
            Ok(response) => return FetchOutcome::new(response, ResponseSource::Network),
            Err(e) => e,
        };

        if let Some(cached) = partition.get(&key).await {
            warn!("Network failed for {} ({}), serving cached copy", key, error);
            metrics::record_cache_hit(partition.name());
            metrics::record_fallback("cache");
            return FetchOutcome::new(cached, ResponseSource::Cache);
        }

        warn!("Network failed for {} ({}) and nothing cached", key, error);
        metrics::record_cache_miss(partition.name());
        self.offline_fallback().await
    }

    /// Serve the cached copy immediately while a refresh runs in the
    /// background; without a cached copy, wait for that refresh.
    pub async fn stale_while_revalidate(
        &self,
        request: &FetchRequest,
        partition: Arc<CachePartition>,
    ) -> FetchOutcome {
        let key = request.cache_key();
        let cached = partition.get(&key).await;

        let network = self.network.clone();
        let background_partition = partition.clone();
        let background_request = request.clone();
        let revalidation: Revalidation = tokio::spawn(async move {
            let result = fetch_and_store(
                network.as_ref(),
                &background_partition,
                &background_request,
            )
            .await;
            if let Err(e) = &result {
                debug!("Revalidation of {} failed: {}", background_request.url, e);
            }
            result
        });

        if let Some(cached) = cached {
            debug!("{}: serving stale {} while revalidating", partition.name(), key);
            metrics::record_cache_hit(partition.name());
            return FetchOutcome {
                response: cached,
                source: ResponseSource::Cache,
                revalidation: Some(revalidation),
            };
        }

        metrics::record_cache_miss(partition.name());
        match revalidation.await {
            Ok(Ok(response)) => FetchOutcome::new(response, ResponseSource::Network),
            Ok(Err(e)) => {
                warn!("Network failed for {} with nothing cached: {}", key, e);
                self.offline_fallback().await
            }
            Err(e) => {
                warn!("Revalidation task for {} aborted: {}", key, e);
                self.offline_fallback().await
            }
        }
    }

    /// Offline document if precached, otherwise a synthetic 503.
    pub async fn offline_fallback(&self) -> FetchOutcome {
        match self
            .storage
            .lookup(&self.offline_partition, &self.offline_key)
            .await
        {
            Some(document) => {
                metrics::record_fallback("offline");
                FetchOutcome::new(document, ResponseSource::Offline)
            }
            None => {
                metrics::record_fallback("synthetic");
                FetchOutcome::new(StoredResponse::offline_unavailable(), ResponseSource::Synthetic)
            }
        }
    }
}

/// One network round-trip; ok responses are written to the partition.
async fn fetch_and_store(
    network: &dyn Network,
    partition: &CachePartition,
    request: &FetchRequest,
) -> Result<StoredResponse, NetworkError> {
    let response = network.fetch(request).await?;

    if response.is_ok() {
        partition.put(request.cache_key(), response.clone()).await;
        metrics::record_cache_store(partition.name());
        metrics::update_partition_entries(partition.name(), partition.len().await);
    } else {
        debug!(
            "{}: not storing {} response for {}",
            partition.name(),
            response.status,
            request.url
        );
        metrics::record_cache_skip(partition.name());
    }

    Ok(response)
}
