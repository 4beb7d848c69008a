use crate::model::order_item::OrderItem as OrderItemModel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderItemResponse {
    pub id: i32,
    pub order_id: i32,
    pub item_id: i32,
    pub variation_id: Option<i32>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl From<OrderItemModel> for OrderItemResponse {
    fn from(value: OrderItemModel) -> Self {
        OrderItemResponse {
            id: value.id,
            order_id: value.order_id,
            item_id: value.item_id,
            variation_id: value.variation_id,
            quantity: value.quantity,
            unit_price: value.unit_price,
            total_price: value.total_price,
        }
    }
}
