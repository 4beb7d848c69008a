use crate::{
    domain::requests::order::{CreateOrderRecordRequest, UpdateOrderRecordRequest},
    model::order::Order as OrderModel,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderCommandRepository = Arc<dyn OrderCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandRepositoryTrait {
    /// Inserts the order row, its table links, items and tokens atomically.
    async fn create_order(
        &self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError>;
    /// Applies the row update, table links, item reconciliation and token plan atomically.
    async fn update_order(
        &self,
        req: &UpdateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError>;
    async fn trash_order(
        &self,
        id: i32,
        deleted_at: DateTime<Utc>,
    ) -> Result<OrderModel, RepositoryError>;
    async fn restore_order(&self, id: i32) -> Result<OrderModel, RepositoryError>;
    /// Removes tokens, items and table links before the order row.
    async fn delete_order(&self, id: i32) -> Result<(), RepositoryError>;
    async fn restore_all_orders(&self) -> Result<u64, RepositoryError>;
    async fn delete_all_trashed_orders(&self) -> Result<u64, RepositoryError>;
}
