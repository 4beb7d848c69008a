use crate::model::order_token::{OrderToken as OrderTokenModel, StationType, TokenPriority, TokenStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderTokenResponse {
    pub id: i32,
    pub token_code: String,
    pub station_type: StationType,
    pub status: TokenStatus,
    pub priority: TokenPriority,
    pub order_item_ids: Vec<i32>,
    #[serde(rename = "created_at")]
    pub created_at: String,
}

impl OrderTokenResponse {
    pub fn from_model(value: OrderTokenModel, order_item_ids: Vec<i32>) -> Self {
        OrderTokenResponse {
            id: value.id,
            token_code: value.token_code,
            station_type: value.station_type,
            status: value.status,
            priority: value.priority,
            order_item_ids,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}
