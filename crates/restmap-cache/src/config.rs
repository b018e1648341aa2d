//! Cache configuration.

use std::time::Duration;

/// Configuration for a [`DiscoveryCache`](crate::DiscoveryCache).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Name reported as the `cache` label on every exported metric.
    pub name: String,
    /// Upper bound on a single discovery fetch. Combined with the caller's
    /// context; the earlier deadline wins.
    pub fetch_timeout: Option<Duration>,
    /// Share one in-flight fetch among concurrent lookups of the same
    /// group/version.
    pub coalesce_fetches: bool,
    /// Initial capacity of the entry table.
    pub initial_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            fetch_timeout: Some(Duration::from_secs(30)),
            coalesce_fetches: true,
            initial_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.name, "default");
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(30)));
        assert!(config.coalesce_fetches);
        assert_eq!(config.initial_capacity, 64);
    }
}
