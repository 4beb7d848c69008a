use crate::cache::CacheBackend;
use anyhow::Context;
use async_trait::async_trait;
use chrono::Duration;
use deadpool_redis::{Connection, Pool};
use std::sync::Arc;
use tracing::{debug, error};

const SCAN_BATCH: usize = 200;

#[derive(Clone)]
pub struct RedisCacheBackend {
    redis_pool: Arc<Pool>,
}

impl RedisCacheBackend {
    pub fn new(redis_pool: Pool) -> Self {
        Self {
            redis_pool: Arc::new(redis_pool),
        }
    }

    async fn get_conn(&self) -> anyhow::Result<Connection> {
        self.redis_pool.get().await.map_err(|e| {
            error!("Failed to get Redis pooled connection: {:?}", e);
            anyhow::anyhow!("redis pool: {e}")
        })
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.get_conn().await?;

        let data: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .with_context(|| format!("GET {key}"))?;

        Ok(data)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.get_conn().await?;

        redis::pipe()
            .cmd("SET")
            .arg(key)
            .arg(value)
            .ignore()
            .cmd("EXPIRE")
            .arg(key)
            .arg(ttl.num_seconds().max(1) as usize)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .with_context(|| format!("SET {key}"))?;

        Ok(())
    }

    async fn list_keys(&self, pattern: &str) -> anyhow::Result<Vec<String>> {
        let mut conn = self.get_conn().await?;
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .with_context(|| format!("SCAN MATCH {pattern}"))?;

            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        keys.sort();
        keys.dedup();

        debug!("SCAN '{}' matched {} keys", pattern, keys.len());
        Ok(keys)
    }

    async fn delete_many(&self, keys: &[String]) -> anyhow::Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;

        let deleted: u64 = redis::cmd("DEL")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .context("DEL")?;

        Ok(deleted)
    }
}
