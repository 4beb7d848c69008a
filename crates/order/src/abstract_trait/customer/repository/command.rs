use crate::model::customer::Customer as CustomerModel;
use anyhow::Result;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynCustomerCommandRepository = Arc<dyn CustomerCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait CustomerCommandRepositoryTrait {
    /// `NotFound` for an unknown customer, `Conflict` when the balance is too low.
    async fn redeem_points(&self, id: i32, points: i64) -> Result<CustomerModel, RepositoryError>;

    async fn award_points(&self, id: i32, points: i64) -> Result<CustomerModel, RepositoryError>;
}
