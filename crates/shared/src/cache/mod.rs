mod cache_store;
mod memory;
mod pattern;
mod redis_backend;

pub use self::cache_store::CacheStore;
pub use self::memory::MemoryCacheBackend;
pub use self::pattern::glob_match;
pub use self::redis_backend::RedisCacheBackend;

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;

pub type DynCacheBackend = Arc<dyn CacheBackend + Send + Sync>;

/// Raw key/value storage behind [`CacheStore`].
///
/// Values are opaque strings; serialization happens in the store.
#[async_trait]
pub trait CacheBackend {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()>;
    async fn list_keys(&self, pattern: &str) -> anyhow::Result<Vec<String>>;
    async fn delete_many(&self, keys: &[String]) -> anyhow::Result<u64>;
}
