use crate::{
    abstract_trait::table::repository::TableCommandRepositoryTrait,
    model::table::{Table as TableModel, TableStatus},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

pub struct TableCommandRepository {
    db: ConnectionPool,
}

impl TableCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TableCommandRepositoryTrait for TableCommandRepository {
    async fn update_status(
        &self,
        id: i32,
        status: TableStatus,
    ) -> Result<TableModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let table = sqlx::query_as::<_, TableModel>(
            r#"
            UPDATE restaurant_tables
            SET status = $2, updated_at = current_timestamp
            WHERE id = $1
            RETURNING id, table_number, capacity, location, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to set table {} to {:?}: {:?}", id, status, e);
            RepositoryError::from_sqlx(e)
        })?;

        info!("🪑 Table {} is now {:?}", table.table_number, table.status);
        Ok(table)
    }
}
