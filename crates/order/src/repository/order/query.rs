use crate::{
    abstract_trait::order::repository::OrderQueryRepositoryTrait,
    domain::requests::order::FindAllOrder,
    model::order::{Order as OrderModel, OrderStatusCount},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::FromRow;
use tracing::{error, info};

#[derive(FromRow)]
struct OrderPageRow {
    #[sqlx(flatten)]
    order: OrderModel,
    total_count: i64,
}

#[derive(Clone, Copy)]
enum Scope {
    All,
    Active,
    Trashed,
}

impl Scope {
    fn clause(self) -> &'static str {
        match self {
            Scope::All => "TRUE",
            Scope::Active => "o.deleted_at IS NULL",
            Scope::Trashed => "o.deleted_at IS NOT NULL",
        }
    }
}

fn page_sql(scope: Scope, req: &FindAllOrder) -> String {
    format!(
        r#"
        SELECT o.*, COUNT(*) OVER() AS total_count
        FROM orders o
        WHERE {scope}
          AND ($1::TEXT IS NULL OR o.order_id ILIKE '%' || $1 || '%')
          AND ($2::order_status IS NULL OR o.status = $2)
          AND ($3::order_type IS NULL OR o.order_type = $3)
          AND ($4::INT IS NULL OR o.customer_id = $4)
          AND ($5::INT IS NULL OR EXISTS (
                SELECT 1 FROM order_tables ot WHERE ot.order_id = o.id AND ot.table_id = $5))
        ORDER BY {column} {direction}, o.id {direction}
        LIMIT $6 OFFSET $7
        "#,
        scope = scope.clause(),
        column = req.sort_by.column(),
        direction = req.sort_order.keyword(),
    )
}

#[derive(Clone)]
pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }

    async fn find_page(
        &self,
        scope: Scope,
        req: &FindAllOrder,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let limit = req.page_size as i64;
        let offset = ((req.page - 1).max(0) * req.page_size) as i64;

        let search_pattern = if req.search.trim().is_empty() {
            None
        } else {
            Some(req.search.trim())
        };

        let sql = page_sql(scope, req);

        let rows = sqlx::query_as::<_, OrderPageRow>(&sql)
            .bind(search_pattern)
            .bind(req.status)
            .bind(req.order_type)
            .bind(req.customer_id)
            .bind(req.table_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch orders: {:?}", e);
                RepositoryError::from_sqlx(e)
            })?;

        let total = rows.first().map(|r| r.total_count).unwrap_or(0);
        let orders = rows.into_iter().map(|r| r.order).collect();

        Ok((orders, total))
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_all(
        &self,
        req: &FindAllOrder,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError> {
        info!("🔍 Fetching all orders with search: {:?}", req.search);
        self.find_page(Scope::All, req).await
    }

    async fn find_active(
        &self,
        req: &FindAllOrder,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError> {
        info!("🟢 Fetching active orders with search: {:?}", req.search);
        self.find_page(Scope::Active, req).await
    }

    async fn find_trashed(
        &self,
        req: &FindAllOrder,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError> {
        info!("🗑️ Fetching trashed orders with search: {:?}", req.search);
        self.find_page(Scope::Trashed, req).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<OrderModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let order = sqlx::query_as::<_, OrderModel>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch order {}: {:?}", id, e);
                RepositoryError::from_sqlx(e)
            })?;

        Ok(order)
    }

    async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to count orders created since {}: {:?}", start, e);
            RepositoryError::from_sqlx(e)
        })?;

        Ok(count)
    }

    async fn summary(&self) -> Result<Vec<OrderStatusCount>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let rows = sqlx::query_as::<_, OrderStatusCount>(
            r#"
            SELECT status,
                   COUNT(*) AS total,
                   COALESCE(SUM(total_amount), 0) AS revenue
            FROM orders
            WHERE deleted_at IS NULL
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to summarize orders: {:?}", e);
            RepositoryError::from_sqlx(e)
        })?;

        info!("📊 Summarized orders across {} statuses", rows.len());
        Ok(rows)
    }
}
