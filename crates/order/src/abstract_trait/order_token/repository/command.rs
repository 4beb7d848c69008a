use crate::{
    domain::requests::order_token::CreateOrderTokenRecordRequest,
    model::order_token::{OrderToken as OrderTokenModel, TokenStatus},
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderTokenCommandRepository = Arc<dyn OrderTokenCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderTokenCommandRepositoryTrait {
    /// Cancels the order's pending tokens and inserts `tokens` in one transaction.
    async fn replace_active_for_order(
        &self,
        order_id: i32,
        tokens: &[CreateOrderTokenRecordRequest],
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderTokenModel>, RepositoryError>;

    async fn retire_active_for_order(
        &self,
        order_id: i32,
        at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;

    async fn update_status(
        &self,
        token_id: i32,
        status: TokenStatus,
        at: DateTime<Utc>,
    ) -> Result<OrderTokenModel, RepositoryError>;
}
