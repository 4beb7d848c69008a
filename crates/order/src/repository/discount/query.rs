use crate::{
    abstract_trait::discount::repository::DiscountQueryRepositoryTrait,
    model::discount::Discount as DiscountModel,
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::error;

#[derive(Clone)]
pub struct DiscountQueryRepository {
    db: ConnectionPool,
}

impl DiscountQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DiscountQueryRepositoryTrait for DiscountQueryRepository {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<DiscountModel>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, DiscountModel>(
            "SELECT * FROM discounts WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch discounts {:?}: {:?}", ids, e);
            RepositoryError::from_sqlx(e)
        })
    }
}
