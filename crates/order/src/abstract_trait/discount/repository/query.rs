use crate::model::discount::Discount as DiscountModel;
use anyhow::Result;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynDiscountQueryRepository = Arc<dyn DiscountQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait DiscountQueryRepositoryTrait {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<DiscountModel>, RepositoryError>;
}
