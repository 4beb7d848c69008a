use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "station_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StationType {
    Bar,
    Kitchen,
}

impl StationType {
    pub fn code_prefix(self) -> char {
        match self {
            StationType::Bar => 'B',
            StationType::Kitchen => 'K',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StationType::Bar => "BAR",
            StationType::Kitchen => "KITCHEN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "token_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenStatus {
    Pending,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "token_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenPriority {
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderToken {
    pub id: i32,
    pub order_id: i32,
    pub token_code: String,
    pub station_type: StationType,
    pub status: TokenStatus,
    pub priority: TokenPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderToken {
    pub fn is_active(&self) -> bool {
        self.status == TokenStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderTokenItem {
    pub token_id: i32,
    pub order_item_id: i32,
    pub position: i32,
}
