use crate::{
    domain::requests::order_token::TokenDraft,
    model::order_token::{StationType, TokenPriority, TokenStatus},
};
use chrono::{DateTime, Utc};
use shared::errors::RepositoryError;
use sqlx::PgConnection;
use tracing::{debug, error};

pub(crate) async fn insert_token(
    conn: &mut PgConnection,
    order_id: i32,
    token_code: &str,
    station_type: StationType,
    priority: TokenPriority,
    order_item_ids: &[i32],
    at: DateTime<Utc>,
) -> Result<i32, RepositoryError> {
    let token_id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO order_tokens (order_id, token_code, station_type, status, priority, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING id
        "#,
    )
    .bind(order_id)
    .bind(token_code)
    .bind(station_type)
    .bind(TokenStatus::Pending)
    .bind(priority)
    .bind(at)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        error!("❌ Failed to insert token {} for order {}: {:?}", token_code, order_id, e);
        RepositoryError::from_sqlx(e)
    })?;

    for (position, order_item_id) in order_item_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_token_items (token_id, order_item_id, position) VALUES ($1, $2, $3)",
        )
        .bind(token_id)
        .bind(order_item_id)
        .bind(position as i32)
        .execute(&mut *conn)
        .await
        .map_err(RepositoryError::from_sqlx)?;
    }

    Ok(token_id)
}

/// Inserts drafts whose items are addressed by position in `item_ids`.
pub(crate) async fn insert_token_drafts(
    conn: &mut PgConnection,
    order_id: i32,
    drafts: &[TokenDraft],
    item_ids: &[i32],
    at: DateTime<Utc>,
) -> Result<Vec<i32>, RepositoryError> {
    let mut token_ids = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let covered = draft
            .item_positions
            .iter()
            .map(|&pos| item_ids.get(pos).copied())
            .collect::<Option<Vec<i32>>>()
            .ok_or_else(|| {
                RepositoryError::Custom(format!(
                    "token {} references an item position outside the order",
                    draft.token_code
                ))
            })?;

        let id = insert_token(
            conn,
            order_id,
            &draft.token_code,
            draft.station_type,
            draft.priority,
            &covered,
            at,
        )
        .await?;
        token_ids.push(id);
    }

    Ok(token_ids)
}

pub(crate) async fn retire_pending_tokens(
    conn: &mut PgConnection,
    order_id: i32,
    at: DateTime<Utc>,
) -> Result<u64, RepositoryError> {
    let retired = sqlx::query(
        r#"
        UPDATE order_tokens
        SET status = $2, updated_at = $3
        WHERE order_id = $1 AND status = $4
        "#,
    )
    .bind(order_id)
    .bind(TokenStatus::Cancelled)
    .bind(at)
    .bind(TokenStatus::Pending)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        error!("❌ Failed to retire tokens of order {}: {:?}", order_id, e);
        RepositoryError::from_sqlx(e)
    })?
    .rows_affected();

    debug!("Retired {} pending tokens of order {}", retired, order_id);
    Ok(retired)
}
