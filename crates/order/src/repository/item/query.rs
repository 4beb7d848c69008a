use crate::{
    abstract_trait::item::repository::ItemQueryRepositoryTrait,
    model::item::{ItemVariation, MenuItem},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::error;

#[derive(Clone)]
pub struct ItemQueryRepository {
    db: ConnectionPool,
}

impl ItemQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemQueryRepositoryTrait for ItemQueryRepository {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<MenuItem>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT i.id, i.name, i.price, i.category_id, c.category_type
            FROM items i
            JOIN categories c ON c.id = i.category_id
            WHERE i.id = ANY($1) AND i.deleted_at IS NULL
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch menu items {:?}: {:?}", ids, e);
            RepositoryError::from_sqlx(e)
        })
    }

    async fn find_variations_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<Vec<ItemVariation>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, ItemVariation>(
            "SELECT id, item_id, name, price FROM item_variations WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(RepositoryError::from_sqlx)
    }
}
