//! `[cache]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [cache]
//! ttl = 86400   # Cache-Control max-age in seconds; 0 or less disables caching
//! ```

use serde::{Deserialize, Serialize};

/// HTTP caching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `max-age` in seconds. Zero or negative turns off `Cache-Control`,
    /// `ETag` and conditional responses for every path.
    pub ttl: i64,
}

impl CacheConfig {
    pub const fn is_enabled(&self) -> bool {
        self.ttl > 0
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: 86400 }
    }
}
