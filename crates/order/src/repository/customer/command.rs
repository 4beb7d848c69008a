use crate::{
    abstract_trait::customer::repository::CustomerCommandRepositoryTrait,
    model::customer::Customer as CustomerModel,
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::PgConnection;
use tracing::{error, info};

pub struct CustomerCommandRepository {
    db: ConnectionPool,
}

impl CustomerCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

async fn customer_exists(conn: &mut PgConnection, id: i32) -> Result<bool, RepositoryError> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1 AND deleted_at IS NULL)",
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await
    .map_err(RepositoryError::from_sqlx)
}

#[async_trait]
impl CustomerCommandRepositoryTrait for CustomerCommandRepository {
    async fn redeem_points(&self, id: i32, points: i64) -> Result<CustomerModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let customer = sqlx::query_as::<_, CustomerModel>(
            r#"
            UPDATE customers
            SET loyalty_points = loyalty_points - $2, updated_at = current_timestamp
            WHERE id = $1 AND deleted_at IS NULL AND loyalty_points >= $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(points)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to redeem {} points from customer {}: {:?}", points, id, e);
            RepositoryError::from_sqlx(e)
        })?;

        match customer {
            Some(customer) => {
                info!("💳 Redeemed {} points from customer {}", points, id);
                Ok(customer)
            }
            None if customer_exists(&mut conn, id).await? => Err(RepositoryError::Conflict(
                format!("customer {id} has fewer than {points} loyalty points"),
            )),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn award_points(&self, id: i32, points: i64) -> Result<CustomerModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let customer = sqlx::query_as::<_, CustomerModel>(
            r#"
            UPDATE customers
            SET loyalty_points = loyalty_points + $2, updated_at = current_timestamp
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(points)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to award {} points to customer {}: {:?}", points, id, e);
            RepositoryError::from_sqlx(e)
        })?
        .ok_or(RepositoryError::NotFound)?;

        info!("🎁 Awarded {} points to customer {}", points, id);
        Ok(customer)
    }
}
