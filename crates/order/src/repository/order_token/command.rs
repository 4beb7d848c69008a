use crate::{
    abstract_trait::order_token::repository::OrderTokenCommandRepositoryTrait,
    domain::requests::order_token::CreateOrderTokenRecordRequest,
    model::order_token::{OrderToken as OrderTokenModel, TokenStatus},
    repository::order_token::write::{insert_token, retire_pending_tokens},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

pub struct OrderTokenCommandRepository {
    db: ConnectionPool,
}

impl OrderTokenCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderTokenCommandRepositoryTrait for OrderTokenCommandRepository {
    async fn replace_active_for_order(
        &self,
        order_id: i32,
        tokens: &[CreateOrderTokenRecordRequest],
        at: DateTime<Utc>,
    ) -> Result<Vec<OrderTokenModel>, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        retire_pending_tokens(&mut tx, order_id, at).await?;

        let mut ids = Vec::with_capacity(tokens.len());
        for token in tokens {
            let id = insert_token(
                &mut tx,
                order_id,
                &token.token_code,
                token.station_type,
                token.priority,
                &token.order_item_ids,
                token.created_at,
            )
            .await?;
            ids.push(id);
        }

        let created = sqlx::query_as::<_, OrderTokenModel>(
            "SELECT * FROM order_tokens WHERE id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        info!("🎫 Issued {} tokens for order {}", created.len(), order_id);
        Ok(created)
    }

    async fn retire_active_for_order(
        &self,
        order_id: i32,
        at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;
        retire_pending_tokens(&mut conn, order_id, at).await
    }

    async fn update_status(
        &self,
        token_id: i32,
        status: TokenStatus,
        at: DateTime<Utc>,
    ) -> Result<OrderTokenModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let token = sqlx::query_as::<_, OrderTokenModel>(
            r#"
            UPDATE order_tokens
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(token_id)
        .bind(status)
        .bind(at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to update token {} to {:?}: {:?}", token_id, status, e);
            RepositoryError::from_sqlx(e)
        })?;

        Ok(token)
    }
}
