use crate::cache::DynCacheBackend;
use chrono::Duration;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct CacheStore {
    backend: DynCacheBackend,
}

impl CacheStore {
    pub fn new(backend: DynCacheBackend) -> Self {
        Self { backend }
    }

    pub async fn get_from_cache<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match self.backend.get(key).await {
            Ok(Some(data)) => match serde_json::from_str::<T>(&data) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    error!(
                        "Failed to deserialize cached value for key '{}': {:?}",
                        key, e
                    );
                    None
                }
            },
            Ok(None) => {
                warn!("Cache miss for key: {key}");
                None
            }
            Err(e) => {
                error!("Cache get error for key '{}': {:?}", key, e);
                None
            }
        }
    }

    pub async fn set_to_cache<T>(&self, key: &str, data: &T, expiration: Duration)
    where
        T: Serialize,
    {
        let json_data = match serde_json::to_string(data) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize data for key '{}': {:?}", key, e);
                return;
            }
        };

        match self.backend.set(key, &json_data, expiration).await {
            Ok(()) => debug!("Cached key '{}' with TTL {:?}", key, expiration),
            Err(e) => error!("Failed to set cache key '{}': {:?}", key, e),
        }
    }

    /// Drops every key matching `pattern` (`*` and `?` wildcards).
    ///
    /// Never fails: a broken cache only widens the stale window up to the TTL.
    pub async fn invalidate(&self, pattern: &str) {
        let keys = match self.backend.list_keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                error!("Failed to list cache keys for pattern '{}': {:?}", pattern, e);
                return;
            }
        };

        if keys.is_empty() {
            debug!("No cache keys matched pattern '{pattern}'");
            return;
        }

        match self.backend.delete_many(&keys).await {
            Ok(deleted) => info!("🧹 Invalidated {deleted} cache keys matching '{pattern}'"),
            Err(e) => error!(
                "Failed to invalidate cache pattern '{}': {:?}",
                pattern, e
            ),
        }
    }
}
