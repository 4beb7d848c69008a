use crate::{
    domain::requests::order::FindAllOrder,
    model::order::{Order as OrderModel, OrderStatusCount},
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryRepositoryTrait {
    async fn find_all(&self, req: &FindAllOrder)
    -> Result<(Vec<OrderModel>, i64), RepositoryError>;
    async fn find_active(
        &self,
        req: &FindAllOrder,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError>;
    async fn find_trashed(
        &self,
        req: &FindAllOrder,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError>;
    /// Trashed orders are included.
    async fn find_by_id(&self, id: i32) -> Result<Option<OrderModel>, RepositoryError>;
    /// Orders created in `[start, end)`, trashed ones included.
    async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, RepositoryError>;
    async fn summary(&self) -> Result<Vec<OrderStatusCount>, RepositoryError>;
}
