//! Axum-based host runtime for the caching worker.
//!
//! The server plays the browser's part: every request that is not aimed at
//! the `/__sw` control API becomes a fetch event for the active worker, and
//! the control API delivers messages, pushes, syncs and notification clicks.
//!
//! # Components
//!
//! - `handlers`: fetch-event proxy and control endpoints.
//! - `middleware`: request ID layers.
//! - `platform`: in-memory notifications and window clients.
//! - `routes`: router and shared state.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod platform;
mod routes;

pub use handlers::SOURCE_HEADER;
pub use platform::ServerPlatform;
pub use routes::{create_router, AppState, CONTROL_PREFIX};
