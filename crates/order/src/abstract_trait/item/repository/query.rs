use crate::model::item::{ItemVariation, MenuItem};
use anyhow::Result;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynItemQueryRepository = Arc<dyn ItemQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait ItemQueryRepositoryTrait {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<MenuItem>, RepositoryError>;

    async fn find_variations_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<Vec<ItemVariation>, RepositoryError>;
}
