use crate::model::table::{Table as TableModel, TableStatus};
use anyhow::Result;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynTableCommandRepository = Arc<dyn TableCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait TableCommandRepositoryTrait {
    async fn update_status(
        &self,
        id: i32,
        status: TableStatus,
    ) -> Result<TableModel, RepositoryError>;
}
