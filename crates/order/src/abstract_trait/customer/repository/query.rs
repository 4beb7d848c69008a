use crate::model::customer::Customer as CustomerModel;
use anyhow::Result;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynCustomerQueryRepository = Arc<dyn CustomerQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait CustomerQueryRepositoryTrait {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<CustomerModel>, RepositoryError>;
}
