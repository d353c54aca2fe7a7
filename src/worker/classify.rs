//! Request classification and the classification → route table.
//!
//! Classification is a pure function of the request's destination, mode,
//! `Accept` header and path; it never looks at cache state. The GET-only
//! gate sits in front of it, in the fetch hook. The route
//! table is a second pure mapping, so "what kind of request is this" and
//! "what do we do about it" can be tested apart.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::cache::PartitionRole;
use crate::config::CacheConfig;
use crate::network::{Destination, FetchRequest, RequestMode};
use phf::phf_map;

/// Derived category of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Api,
    Image,
    Static,
    Document,
    Other,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::Api => "api",
            RequestClass::Image => "image",
            RequestClass::Static => "static",
            RequestClass::Document => "document",
            RequestClass::Other => "other",
        }
    }

    /// The caching route for this class
    pub fn route(self) -> Route {
        match self {
            RequestClass::Api => Route::new(Strategy::NetworkFirst, PartitionRole::Api),
            RequestClass::Image => Route::new(Strategy::CacheFirst, PartitionRole::Image),
            RequestClass::Static => Route::new(Strategy::CacheFirst, PartitionRole::Static),
            RequestClass::Document => Route::new(Strategy::NetworkFirst, PartitionRole::Static),
            RequestClass::Other => {
                Route::new(Strategy::StaleWhileRevalidate, PartitionRole::Static)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache_first",
            Strategy::NetworkFirst => "network_first",
            Strategy::StaleWhileRevalidate => "stale_while_revalidate",
        }
    }
}

/// A strategy bound to the partition it reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub strategy: Strategy,
    pub partition: PartitionRole,
}

impl Route {
    pub const fn new(strategy: Strategy, partition: PartitionRole) -> Self {
        Self {
            strategy,
            partition,
        }
    }
}

/// File extensions that identify a request's class when the browser did
/// not say (or lied about) the destination.
static EXTENSION_CLASSES: phf::Map<&'static str, RequestClass> = phf_map! {
    "png" => RequestClass::Image,
    "jpg" => RequestClass::Image,
    "jpeg" => RequestClass::Image,
    "gif" => RequestClass::Image,
    "webp" => RequestClass::Image,
    "avif" => RequestClass::Image,
    "svg" => RequestClass::Image,
    "ico" => RequestClass::Image,
    "js" => RequestClass::Static,
    "mjs" => RequestClass::Static,
    "css" => RequestClass::Static,
    "woff" => RequestClass::Static,
    "woff2" => RequestClass::Static,
    "ttf" => RequestClass::Static,
    "otf" => RequestClass::Static,
    "eot" => RequestClass::Static,
};

/// Classifies requests against the configured prefix tables.
#[derive(Debug, Clone)]
pub struct Classifier {
    api_prefixes: Vec<String>,
    static_prefixes: Vec<String>,
}

impl Classifier {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            api_prefixes: config.api_prefixes.clone(),
            static_prefixes: config.static_prefixes.clone(),
        }
    }

    /// Classify a request. Checks run in priority order: API allow-list,
    /// image, static asset, document, then everything else.
    pub fn classify(&self, request: &FetchRequest) -> RequestClass {
        let path = request.path();
        let by_extension = extension_of(path).and_then(|ext| EXTENSION_CLASSES.get(ext.as_str()).copied());

        if self.api_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return RequestClass::Api;
        }

        if request.destination == Destination::Image || by_extension == Some(RequestClass::Image) {
            return RequestClass::Image;
        }

        if matches!(
            request.destination,
            Destination::Script | Destination::Style | Destination::Font
        ) || by_extension == Some(RequestClass::Static)
            || self.static_prefixes.iter().any(|p| path.starts_with(p.as_str()))
        {
            return RequestClass::Static;
        }

        if request.destination == Destination::Document
            || request.mode == RequestMode::Navigate
            || request.accepts_html()
        {
            return RequestClass::Document;
        }

        RequestClass::Other
    }
}

/// Lowercased extension of the last path segment
fn extension_of(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method};

    fn classifier() -> Classifier {
        Classifier::new(&CacheConfig::default())
    }

    #[test]
    fn test_api_prefix_wins_over_extension() {
        let request = FetchRequest::get("/api/jobs/logo.png");
        assert_eq!(classifier().classify(&request), RequestClass::Api);
    }

    #[test]
    fn test_image_by_destination_or_extension() {
        let c = classifier();
        let by_dest = FetchRequest::get("/_next/image?url=%2Fhero&w=640").with_destination(Destination::Image);
        assert_eq!(c.classify(&by_dest), RequestClass::Image);
        assert_eq!(c.classify(&FetchRequest::get("/images/Globe.JPG")), RequestClass::Image);
    }

    #[test]
    fn test_static_assets() {
        let c = classifier();
        assert_eq!(c.classify(&FetchRequest::get("/_next/static/chunks/main.js")), RequestClass::Static);
        assert_eq!(c.classify(&FetchRequest::get("/fonts/inter.woff2")), RequestClass::Static);
        let styled = FetchRequest::get("/theme").with_destination(Destination::Style);
        assert_eq!(c.classify(&styled), RequestClass::Static);
    }

    #[test]
    fn test_documents() {
        let c = classifier();
        let nav = FetchRequest::get("/en/careers").with_mode(RequestMode::Navigate);
        assert_eq!(c.classify(&nav), RequestClass::Document);
        let html = FetchRequest::get("/en/about").with_header(header::ACCEPT, "text/html,application/xhtml+xml");
        assert_eq!(c.classify(&html), RequestClass::Document);
    }

    #[test]
    fn test_everything_else_is_other() {
        let c = classifier();
        assert_eq!(c.classify(&FetchRequest::get("/manifest.json")), RequestClass::Other);
        assert_eq!(c.classify(&FetchRequest::get("/.well-known/security")), RequestClass::Other);
    }

    #[test]
    fn test_classification_ignores_method() {
        let c = classifier();
        let post = FetchRequest::new(Method::POST, "/api/applications");
        assert_eq!(c.classify(&post), RequestClass::Api);
    }

    #[test]
    fn test_route_table() {
        assert_eq!(RequestClass::Api.route(), Route::new(Strategy::NetworkFirst, PartitionRole::Api));
        assert_eq!(RequestClass::Image.route(), Route::new(Strategy::CacheFirst, PartitionRole::Image));
        assert_eq!(RequestClass::Static.route(), Route::new(Strategy::CacheFirst, PartitionRole::Static));
        assert_eq!(RequestClass::Document.route(), Route::new(Strategy::NetworkFirst, PartitionRole::Static));
        assert_eq!(
            RequestClass::Other.route(),
            Route::new(Strategy::StaleWhileRevalidate, PartitionRole::Static)
        );
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/a/b.PNG"), Some("png".to_string()));
        assert_eq!(extension_of("/a.b/c"), None);
        assert_eq!(extension_of("/.env"), None);
        assert_eq!(extension_of("/"), None);
    }
}
