use crate::model::order_token::{OrderToken as OrderTokenModel, OrderTokenItem};
use anyhow::Result;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderTokenQueryRepository = Arc<dyn OrderTokenQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderTokenQueryRepositoryTrait {
    async fn code_exists(&self, token_code: &str) -> Result<bool, RepositoryError>;

    async fn find_by_order_ids(
        &self,
        order_ids: &[i32],
    ) -> Result<Vec<OrderTokenModel>, RepositoryError>;

    async fn find_items_by_token_ids(
        &self,
        token_ids: &[i32],
    ) -> Result<Vec<OrderTokenItem>, RepositoryError>;
}
