// Validated client handle cache
// Author: kelexine (https://github.com/kelexine)

pub mod manager;
pub mod models;

pub use manager::{Acquired, ClientCache, ClientHandle};
pub use models::{CacheConfig, CacheStats, Clock, ManualClock, SystemClock};
