// Caching strategy behaviour through the fetch hook
// Author: kelexine (https://github.com/kelexine)

mod common;

use axum::http::{Method, StatusCode};
use common::{active_worker, online_origin};
use issi_swcache::cache::{CacheKey, CacheStorage, StoredResponse};
use issi_swcache::network::{Destination, FetchRequest, RequestMode};
use issi_swcache::worker::ResponseSource;

#[tokio::test]
async fn test_cache_first_hit_avoids_network() {
    let network = online_origin();
    let storage = CacheStorage::new();
    let worker = active_worker("v1", &storage, network.clone()).await;

    storage
        .open("image-v1")
        .await
        .put(CacheKey::get("/images/globe.png"), StoredResponse::new(StatusCode::OK, "png-bytes"))
        .await;
    let before = network.call_count();

    let request = FetchRequest::get("/images/globe.png").with_destination(Destination::Image);
    let outcome = worker.on_fetch(&request).await.unwrap();

    assert_eq!(outcome.source, ResponseSource::Cache);
    assert_eq!(outcome.response.body, "png-bytes");
    assert_eq!(network.call_count(), before);
}

#[tokio::test]
async fn test_cache_first_miss_populates_partition() {
    let network = online_origin();
    network.respond("/images/team.webp", StatusCode::OK, "webp-bytes");
    let storage = CacheStorage::new();
    let worker = active_worker("v1", &storage, network.clone()).await;

    let outcome = worker.on_fetch(&FetchRequest::get("/images/team.webp")).await.unwrap();

    assert_eq!(outcome.source, ResponseSource::Network);
    assert_eq!(outcome.response.body, "webp-bytes");
    let stored = storage.lookup("image-v1", &CacheKey::get("/images/team.webp")).await;
    assert_eq!(stored, Some(outcome.response));
}

#[tokio::test]
async fn test_cache_first_offline_miss_serves_offline_document() {
    let network = online_origin();
    let storage = CacheStorage::new();
    let worker = active_worker("v1", &storage, network.clone()).await;
    network.set_offline(true);

    let outcome = worker
        .on_fetch(&FetchRequest::get("/_next/static/chunks/app.js"))
        .await
        .unwrap();

    assert_eq!(outcome.source, ResponseSource::Offline);
    assert_eq!(outcome.response.body, "<html>home</html>");
}

#[tokio::test]
async fn test_network_first_prefers_fresh_data() {
    let network = online_origin();
    network.respond("/api/jobs", StatusCode::OK, "[\"fresh\"]");
    let storage = CacheStorage::new();
    let worker = active_worker("v1", &storage, network.clone()).await;

    let api = storage.open("api-v1").await;
    api.put(CacheKey::get("/api/jobs"), StoredResponse::new(StatusCode::OK, "[\"stale\"]"))
        .await;

    let outcome = worker.on_fetch(&FetchRequest::get("/api/jobs")).await.unwrap();

    assert_eq!(outcome.source, ResponseSource::Network);
    assert_eq!(outcome.response.body, "[\"fresh\"]");
    assert_eq!(api.get(&CacheKey::get("/api/jobs")).await.unwrap().body, "[\"fresh\"]");
}

#[tokio::test]
async fn test_network_first_degrades_offline() {
    let network = online_origin();
    let storage = CacheStorage::new();
    let worker = active_worker("v1", &storage, network.clone()).await;

    storage
        .open("api-v1")
        .await
        .put(CacheKey::get("/api/jobs"), StoredResponse::new(StatusCode::OK, "[\"stale\"]"))
        .await;
    network.set_offline(true);

    let cached = worker.on_fetch(&FetchRequest::get("/api/jobs")).await.unwrap();
    assert_eq!(cached.source, ResponseSource::Cache);
    assert_eq!(cached.response.body, "[\"stale\"]");

    let uncached = worker
        .on_fetch(&FetchRequest::get("/api/applications/42"))
        .await
        .unwrap();
    assert_eq!(uncached.source, ResponseSource::Offline);
    assert_eq!(uncached.response.body, "<html>home</html>");
}

#[tokio::test]
async fn test_network_first_without_offline_document_is_503() {
    let network = online_origin();
    let storage = CacheStorage::new();
    let mut config = common::test_config("v1");
    config.cache.offline_path = "/offline".to_string();
    let worker = common::build_worker(
        &config,
        &storage,
        network.clone(),
        std::sync::Arc::new(issi_swcache::server::ServerPlatform::new()),
    );
    worker.on_install().await.unwrap();
    worker.on_activate().await.unwrap();
    network.set_offline(true);

    let request = FetchRequest::get("/en/careers").with_mode(RequestMode::Navigate);
    let outcome = worker.on_fetch(&request).await.unwrap();

    assert_eq!(outcome.source, ResponseSource::Synthetic);
    assert_eq!(outcome.response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_stale_while_revalidate_does_not_block_when_cached() {
    let network = online_origin();
    network.respond("/manifest.json", StatusCode::OK, "{\"name\":\"ISSI v2\"}");
    let storage = CacheStorage::new();
    let worker = active_worker("v1", &storage, network.clone()).await;
    network.respond("/manifest.json", StatusCode::OK, "{\"name\":\"ISSI v3\"}");

    let static_partition = storage.open("static-v1").await;
    let key = CacheKey::get("/manifest.json");
    let precached = static_partition.get(&key).await.unwrap();

    // Every fetch now blocks until released
    let gate = network.hold();
    let outcome = worker.on_fetch(&FetchRequest::get("/manifest.json")).await.unwrap();

    assert_eq!(outcome.source, ResponseSource::Cache);
    assert_eq!(outcome.response, precached);
    assert_eq!(static_partition.get(&key).await.unwrap(), precached);

    gate.notify_one();
    let refreshed = outcome.revalidation.expect("revalidation handle").await.unwrap().unwrap();
    assert_eq!(refreshed.body, "{\"name\":\"ISSI v3\"}");
    assert_eq!(static_partition.get(&key).await.unwrap().body, "{\"name\":\"ISSI v3\"}");
}

#[tokio::test]
async fn test_only_get_requests_touch_the_cache() {
    let network = online_origin();
    let storage = CacheStorage::new();
    let worker = active_worker("v1", &storage, network.clone()).await;
    let partitions_before = storage.keys().await;
    let calls_before = network.call_count();

    for url in ["/api/applications", "/images/logo.png", "/_next/static/app.js", "/en", "/robots.txt"] {
        let request = FetchRequest::new(Method::POST, url).with_body("name=Ada");
        assert!(worker.on_fetch(&request).await.is_none(), "{} should pass through", url);
    }

    assert_eq!(storage.keys().await, partitions_before);
    assert_eq!(network.call_count(), calls_before);
}

#[tokio::test]
async fn test_error_responses_are_never_stored() {
    let network = online_origin();
    network.respond("/api/jobs", StatusCode::INTERNAL_SERVER_ERROR, "boom");
    network.respond("/images/broken.png", StatusCode::INTERNAL_SERVER_ERROR, "boom");
    network.respond("/feed.xml", StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let storage = CacheStorage::new();
    let worker = active_worker("v1", &storage, network.clone()).await;

    let cases = [
        ("/api/jobs", "api-v1"),
        ("/images/broken.png", "image-v1"),
        ("/feed.xml", "static-v1"),
    ];
    for (url, partition) in cases {
        let outcome = worker.on_fetch(&FetchRequest::get(url)).await.unwrap();
        assert_eq!(outcome.response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outcome.source, ResponseSource::Network);
        assert!(
            storage.lookup(partition, &CacheKey::get(url)).await.is_none(),
            "{} must not be stored in {}",
            url,
            partition
        );
    }
}
