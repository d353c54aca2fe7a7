// Cache storage module
// Author: kelexine (https://github.com/kelexine)

pub mod models;
pub mod storage;

pub use models::{CacheKey, PartitionNames, PartitionRole, StoredResponse};
pub use storage::{CachePartition, CacheStorage};
