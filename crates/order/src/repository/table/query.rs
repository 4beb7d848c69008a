use crate::{
    abstract_trait::table::repository::TableQueryRepositoryTrait,
    model::table::{OrderTable, Table as TableModel},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::error;

#[derive(Clone)]
pub struct TableQueryRepository {
    db: ConnectionPool,
}

impl TableQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TableQueryRepositoryTrait for TableQueryRepository {
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<TableModel>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, TableModel>(
            r#"
            SELECT id, table_number, capacity, location, status, created_at, updated_at
            FROM restaurant_tables
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch tables {:?}: {:?}", ids, e);
            RepositoryError::from_sqlx(e)
        })
    }

    async fn find_by_order(&self, order_id: i32) -> Result<Vec<TableModel>, RepositoryError> {
        Ok(self
            .find_by_order_ids(&[order_id])
            .await?
            .into_iter()
            .map(|row| row.table)
            .collect())
    }

    async fn find_by_order_ids(
        &self,
        order_ids: &[i32],
    ) -> Result<Vec<OrderTable>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, OrderTable>(
            r#"
            SELECT ot.order_id,
                   t.id, t.table_number, t.capacity, t.location, t.status, t.created_at, t.updated_at
            FROM order_tables ot
            JOIN restaurant_tables t ON t.id = ot.table_id
            WHERE ot.order_id = ANY($1)
            ORDER BY ot.order_id, t.table_number
            "#,
        )
        .bind(order_ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch tables of orders {:?}: {:?}", order_ids, e);
            RepositoryError::from_sqlx(e)
        })
    }
}
