//! The caching service worker.
//!
//! # Submodules
//!
//! - `classify`: request classification and the route table.
//! - `strategy`: cache-first, network-first and stale-while-revalidate.
//! - `manager`: one worker version and its lifecycle hooks.
//! - `registration`: active/waiting bookkeeping across versions.
//! - `notification`: push payloads and the platform notification surface.
//! - `sync`: the background sync extension point.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod classify;
pub mod manager;
pub mod notification;
pub mod registration;
pub mod state;
pub mod strategy;
pub mod sync;

pub use classify::{Classifier, RequestClass, Route, Strategy};
pub use manager::AssetCacheManager;
pub use notification::{
    Notification, NotificationAction, NotificationClick, NotificationData, Platform, PushPayload,
    WindowClient,
};
pub use registration::Registration;
pub use state::{ClientMessage, WorkerState};
pub use strategy::{FetchOutcome, ResponseSource, Revalidation, Strategies};
pub use sync::{BackgroundSync, NoBackgroundSync};
