use crate::model::table::{OrderTable, Table as TableModel};
use anyhow::Result;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynTableQueryRepository = Arc<dyn TableQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait TableQueryRepositoryTrait {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<TableModel>, RepositoryError>;

    async fn find_by_order(&self, order_id: i32) -> Result<Vec<TableModel>, RepositoryError>;

    async fn find_by_order_ids(
        &self,
        order_ids: &[i32],
    ) -> Result<Vec<OrderTable>, RepositoryError>;
}
