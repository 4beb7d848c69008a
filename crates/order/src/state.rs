use crate::{
    config::myconfig::Config,
    di::{DependenciesInject, DependenciesInjectDeps},
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    config::{ConnectionPool, RedisClient, RedisConfig},
    utils::{ProcessMetrics, run_metrics_collector},
};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
    pub process_metrics: Arc<ProcessMetrics>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("deps", &self.di_container)
            .field("process_metrics", &self.process_metrics)
            .finish()
    }
}

impl AppState {
    pub async fn new(pool: ConnectionPool, config: &Config) -> Result<Self> {
        let mut registry = Registry::default();
        let process_metrics = Arc::new(ProcessMetrics::default());

        let redis_config = RedisConfig::new(
            config.redis.host.clone(),
            config.redis.port,
            config.redis.db,
            config.redis.password.clone(),
        );

        let redis = RedisClient::new(&redis_config).context("Failed to connect to Redis")?;

        redis
            .ping()
            .await
            .context("Failed to ping Redis server")?;

        let deps = DependenciesInjectDeps {
            pool,
            redis,
            loyalty: config.loyalty.clone(),
        };

        let di_container = DependenciesInject::new(deps, &mut registry)
            .context("Failed to initialize dependency injection container")?;

        process_metrics.register(&mut registry);

        tokio::spawn(run_metrics_collector(process_metrics.clone()));

        Ok(Self {
            di_container,
            registry: Arc::new(Mutex::new(registry)),
            process_metrics,
        })
    }
}
