//! Utility functions and helpers for the issi-swcache host.
//!
//! # Submodules
//!
//! - `logging`: Tracing subscriber initialization.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
