use crate::model::order_token::{StationType, TokenPriority};
use chrono::{DateTime, Utc};

/// A token ready to persist; items are addressed by their position in the
/// order's item list because new items have no id before the insert.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDraft {
    pub token_code: String,
    pub station_type: StationType,
    pub priority: TokenPriority,
    pub item_positions: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderTokenRecordRequest {
    pub order_id: i32,
    pub token_code: String,
    pub station_type: StationType,
    pub priority: TokenPriority,
    pub order_item_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
}

/// What an order write does to the order's tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TokenPlan {
    #[default]
    Keep,
    RetireAll,
    Replace(Vec<TokenDraft>),
}
