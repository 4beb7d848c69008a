use crate::{
    abstract_trait::order::repository::OrderCommandRepositoryTrait,
    domain::requests::{
        order::{CreateOrderRecordRequest, OrderItemRecord, UpdateOrderRecordRequest},
        order_token::TokenPlan,
    },
    model::order::Order as OrderModel,
    repository::order_token::{insert_token_drafts, retire_pending_tokens},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::PgConnection;
use tracing::{error, info};

pub struct OrderCommandRepository {
    db: ConnectionPool,
}

impl OrderCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

async fn link_tables(
    conn: &mut PgConnection,
    order_id: i32,
    table_ids: &[i32],
) -> Result<(), RepositoryError> {
    for table_id in table_ids {
        sqlx::query("INSERT INTO order_tables (order_id, table_id) VALUES ($1, $2)")
            .bind(order_id)
            .bind(table_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to link table {} to order {}: {:?}", table_id, order_id, e);
                RepositoryError::from_sqlx(e)
            })?;
    }
    Ok(())
}

async fn insert_item(
    conn: &mut PgConnection,
    order_id: i32,
    position: i32,
    item: &OrderItemRecord,
    at: DateTime<Utc>,
) -> Result<i32, RepositoryError> {
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO order_items
            (order_id, item_id, variation_id, quantity, unit_price, total_price, position, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING id
        "#,
    )
    .bind(order_id)
    .bind(item.item_id)
    .bind(item.variation_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.total_price)
    .bind(position)
    .bind(at)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        error!("❌ Failed to insert item {} for order {}: {:?}", item.item_id, order_id, e);
        RepositoryError::from_sqlx(e)
    })
}

async fn update_item(
    conn: &mut PgConnection,
    order_id: i32,
    id: i32,
    position: i32,
    item: &OrderItemRecord,
    at: DateTime<Utc>,
) -> Result<i32, RepositoryError> {
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE order_items
        SET item_id      = $3,
            variation_id = $4,
            quantity     = $5,
            unit_price   = $6,
            total_price  = $7,
            position     = $8,
            updated_at   = $9
        WHERE id = $1 AND order_id = $2
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(order_id)
    .bind(item.item_id)
    .bind(item.variation_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.total_price)
    .bind(position)
    .bind(at)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| {
        error!("❌ Failed to update order item {}: {:?}", id, e);
        RepositoryError::from_sqlx(e)
    })?
    .ok_or(RepositoryError::NotFound)
}

/// Permanent delete of the given orders and everything hanging off them.
async fn purge_orders(conn: &mut PgConnection, ids: &[i32]) -> Result<u64, RepositoryError> {
    let steps = [
        "DELETE FROM order_token_items WHERE token_id IN (SELECT id FROM order_tokens WHERE order_id = ANY($1))",
        "DELETE FROM order_tokens WHERE order_id = ANY($1)",
        "DELETE FROM order_items WHERE order_id = ANY($1)",
        "DELETE FROM order_tables WHERE order_id = ANY($1)",
    ];

    for sql in steps {
        sqlx::query(sql)
            .bind(ids)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Cascade step failed for orders {:?}: {:?}", ids, e);
                RepositoryError::from_sqlx(e)
            })?;
    }

    let deleted = sqlx::query("DELETE FROM orders WHERE id = ANY($1)")
        .bind(ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to delete orders {:?}: {:?}", ids, e);
            RepositoryError::from_sqlx(e)
        })?
        .rows_affected();

    Ok(deleted)
}

#[async_trait]
impl OrderCommandRepositoryTrait for OrderCommandRepository {
    async fn create_order(
        &self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let order = sqlx::query_as::<_, OrderModel>(
            r#"
            INSERT INTO orders
                (order_id, order_type, status, subtotal, discount_amount, total_amount,
                 payment_method, customer_id, user_id, discount_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(&req.order_id)
        .bind(req.order_type)
        .bind(req.status)
        .bind(req.subtotal)
        .bind(req.discount_amount)
        .bind(req.total_amount)
        .bind(req.payment_method)
        .bind(req.customer_id)
        .bind(req.user_id)
        .bind(req.discount_id)
        .bind(req.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to create order {}: {:?}", req.order_id, err);
            RepositoryError::from_sqlx(err)
        })?;

        link_tables(&mut tx, order.id, &req.table_ids).await?;

        let mut item_ids = Vec::with_capacity(req.items.len());
        for (position, item) in req.items.iter().enumerate() {
            item_ids.push(insert_item(&mut tx, order.id, position as i32, item, req.created_at).await?);
        }

        insert_token_drafts(&mut tx, order.id, &req.tokens, &item_ids, req.created_at).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        info!(
            "✅ Created order {} (id {}) with {} items and {} tokens",
            order.order_id,
            order.id,
            item_ids.len(),
            req.tokens.len()
        );
        Ok(order)
    }

    async fn update_order(
        &self,
        req: &UpdateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let order = sqlx::query_as::<_, OrderModel>(
            r#"
            UPDATE orders
            SET order_type          = $2,
                status              = $3,
                subtotal            = $4,
                discount_amount     = $5,
                total_amount        = $6,
                payment_method      = $7,
                completion_duration = $8,
                customer_id         = $9,
                user_id             = $10,
                discount_id         = $11,
                updated_at          = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(req.id)
        .bind(req.order_type)
        .bind(req.status)
        .bind(req.subtotal)
        .bind(req.discount_amount)
        .bind(req.total_amount)
        .bind(req.payment_method)
        .bind(req.completion_duration)
        .bind(req.customer_id)
        .bind(req.user_id)
        .bind(req.discount_id)
        .bind(req.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to update order ID {}: {:?}", req.id, err);
            RepositoryError::from_sqlx(err)
        })?
        .ok_or(RepositoryError::NotFound)?;

        if let Some(table_ids) = &req.table_ids {
            sqlx::query("DELETE FROM order_tables WHERE order_id = $1")
                .bind(order.id)
                .execute(&mut *tx)
                .await
                .map_err(RepositoryError::from_sqlx)?;

            link_tables(&mut tx, order.id, table_ids).await?;
        }

        let mut item_ids: Option<Vec<i32>> = None;

        if let Some(reconciliation) = &req.items {
            if !reconciliation.removed_ids.is_empty() {
                sqlx::query("DELETE FROM order_token_items WHERE order_item_id = ANY($1)")
                    .bind(&reconciliation.removed_ids)
                    .execute(&mut *tx)
                    .await
                    .map_err(RepositoryError::from_sqlx)?;

                sqlx::query("DELETE FROM order_items WHERE order_id = $1 AND id = ANY($2)")
                    .bind(order.id)
                    .bind(&reconciliation.removed_ids)
                    .execute(&mut *tx)
                    .await
                    .map_err(RepositoryError::from_sqlx)?;
            }

            let mut ids = Vec::with_capacity(reconciliation.items.len());
            for (position, item) in reconciliation.items.iter().enumerate() {
                let position = position as i32;
                let id = match item.id {
                    Some(id) => {
                        update_item(&mut tx, order.id, id, position, item, req.updated_at).await?
                    }
                    None => insert_item(&mut tx, order.id, position, item, req.updated_at).await?,
                };
                ids.push(id);
            }
            item_ids = Some(ids);
        }

        match &req.tokens {
            TokenPlan::Keep => {}
            TokenPlan::RetireAll => {
                retire_pending_tokens(&mut tx, order.id, req.updated_at).await?;
            }
            TokenPlan::Replace(drafts) => {
                let ids = match item_ids {
                    Some(ids) => ids,
                    None => sqlx::query_scalar::<_, i32>(
                        "SELECT id FROM order_items WHERE order_id = $1 ORDER BY position, id",
                    )
                    .bind(order.id)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(RepositoryError::from_sqlx)?,
                };

                retire_pending_tokens(&mut tx, order.id, req.updated_at).await?;
                insert_token_drafts(&mut tx, order.id, drafts, &ids, req.updated_at).await?;
            }
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        info!("🔄 Updated order {} (id {})", order.order_id, order.id);
        Ok(order)
    }

    async fn trash_order(
        &self,
        id: i32,
        deleted_at: DateTime<Utc>,
    ) -> Result<OrderModel, RepositoryError> {
        info!("🗑️ Trashing order: {}", id);

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let order = sqlx::query_as::<_, OrderModel>(
            r#"
            UPDATE orders
            SET deleted_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(deleted_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to trash order {}: {:?}", id, e);
            RepositoryError::from_sqlx(e)
        })?;

        Ok(order)
    }

    async fn restore_order(&self, id: i32) -> Result<OrderModel, RepositoryError> {
        info!("🔄 Restoring order: {}", id);

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let order = sqlx::query_as::<_, OrderModel>(
            r#"
            UPDATE orders
            SET deleted_at = NULL
            WHERE id = $1 AND deleted_at IS NOT NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to restore order {}: {:?}", id, e);
            RepositoryError::from_sqlx(e)
        })?;

        Ok(order)
    }

    async fn delete_order(&self, id: i32) -> Result<(), RepositoryError> {
        info!("🧨 Permanently deleting order: {}", id);

        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let deleted = purge_orders(&mut tx, &[id]).await?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        info!("✅ Order {} permanently deleted", id);
        Ok(())
    }

    async fn restore_all_orders(&self) -> Result<u64, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let restored =
            sqlx::query("UPDATE orders SET deleted_at = NULL WHERE deleted_at IS NOT NULL")
                .execute(&mut *conn)
                .await
                .map_err(|e| {
                    error!("❌ Failed to restore trashed orders: {:?}", e);
                    RepositoryError::from_sqlx(e)
                })?
                .rows_affected();

        info!("🔄 Restored {} orders", restored);
        Ok(restored)
    }

    async fn delete_all_trashed_orders(&self) -> Result<u64, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let ids = sqlx::query_scalar::<_, i32>("SELECT id FROM orders WHERE deleted_at IS NOT NULL")
            .fetch_all(&mut *tx)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        if ids.is_empty() {
            return Ok(0);
        }

        let deleted = purge_orders(&mut tx, &ids).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        info!("🧨 Permanently deleted {} trashed orders", deleted);
        Ok(deleted)
    }
}
