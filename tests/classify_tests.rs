// Classification properties
// Author: kelexine (https://github.com/kelexine)

use axum::http::Method;
use issi_swcache::config::CacheConfig;
use issi_swcache::network::FetchRequest;
use issi_swcache::worker::{Classifier, RequestClass, Strategy};
use proptest::prelude::*;

fn classifier() -> Classifier {
    Classifier::new(&CacheConfig::default())
}

proptest! {
    #[test]
    fn api_paths_are_always_network_first(suffix in "[a-z0-9/_-]{0,24}") {
        for prefix in ["/api/jobs", "/api/applications"] {
            let request = FetchRequest::get(format!("{}{}", prefix, suffix));
            let class = classifier().classify(&request);
            prop_assert_eq!(class, RequestClass::Api);
            prop_assert_eq!(class.route().strategy, Strategy::NetworkFirst);
        }
    }

    #[test]
    fn classification_is_independent_of_method(path in "/[a-z]{1,8}(/[a-z]{1,8}){0,2}(\\.(png|js|css|html|json))?") {
        let c = classifier();
        let get = c.classify(&FetchRequest::new(Method::GET, path.clone()));
        let post = c.classify(&FetchRequest::new(Method::POST, path.clone()));
        let put = c.classify(&FetchRequest::new(Method::PUT, path));
        prop_assert_eq!(get, post);
        prop_assert_eq!(get, put);
    }

    #[test]
    fn image_extensions_are_cache_first(stem in "[a-z0-9_-]{1,12}", ext in "(png|jpg|jpeg|gif|webp|svg|ico)") {
        let request = FetchRequest::get(format!("/images/{}.{}", stem, ext));
        let class = classifier().classify(&request);
        prop_assert_eq!(class, RequestClass::Image);
        prop_assert_eq!(class.route().strategy, Strategy::CacheFirst);
    }
}
