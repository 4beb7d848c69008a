use crate::{
    abstract_trait::order_token::repository::OrderTokenQueryRepositoryTrait,
    model::order_token::{OrderToken as OrderTokenModel, OrderTokenItem},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::error;

#[derive(Clone)]
pub struct OrderTokenQueryRepository {
    db: ConnectionPool,
}

impl OrderTokenQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderTokenQueryRepositoryTrait for OrderTokenQueryRepository {
    async fn code_exists(&self, token_code: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM order_tokens WHERE token_code = $1)",
        )
        .bind(token_code)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to check token code {}: {:?}", token_code, e);
            RepositoryError::from_sqlx(e)
        })
    }

    async fn find_by_order_ids(
        &self,
        order_ids: &[i32],
    ) -> Result<Vec<OrderTokenModel>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, OrderTokenModel>(
            "SELECT * FROM order_tokens WHERE order_id = ANY($1) ORDER BY order_id, id",
        )
        .bind(order_ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch tokens for orders {:?}: {:?}", order_ids, e);
            RepositoryError::from_sqlx(e)
        })
    }

    async fn find_items_by_token_ids(
        &self,
        token_ids: &[i32],
    ) -> Result<Vec<OrderTokenItem>, RepositoryError> {
        if token_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, OrderTokenItem>(
            r#"
            SELECT token_id, order_item_id, position
            FROM order_token_items
            WHERE token_id = ANY($1)
            ORDER BY token_id, position
            "#,
        )
        .bind(token_ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(RepositoryError::from_sqlx)
    }
}
