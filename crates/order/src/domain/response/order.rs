use crate::{
    domain::response::{
        customer::CustomerResponse, discount::DiscountResponse, order_item::OrderItemResponse,
        order_token::OrderTokenResponse, table::TableResponse,
    },
    model::order::{Order as OrderModel, OrderStatus, OrderStatusCount, OrderType, PaymentMethod},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The order aggregate with every relation populated.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderResponse {
    pub id: i32,
    pub order_id: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub completion_duration: Option<i32>,
    pub user_id: Option<i32>,
    pub customer: Option<CustomerResponse>,
    pub discount: Option<DiscountResponse>,
    pub tables: Vec<TableResponse>,
    pub items: Vec<OrderItemResponse>,
    pub tokens: Vec<OrderTokenResponse>,
    #[serde(rename = "created_at")]
    pub created_at: String,
    #[serde(rename = "updated_at")]
    pub updated_at: String,
    #[serde(rename = "deleted_at")]
    pub deleted_at: Option<String>,
}

// model to response, relations filled in by the assembler
impl From<OrderModel> for OrderResponse {
    fn from(value: OrderModel) -> Self {
        OrderResponse {
            id: value.id,
            order_id: value.order_id,
            order_type: value.order_type,
            status: value.status,
            subtotal: value.subtotal,
            discount_amount: value.discount_amount,
            total_amount: value.total_amount,
            payment_method: value.payment_method,
            completion_duration: value.completion_duration,
            user_id: value.user_id,
            customer: None,
            discount: None,
            tables: Vec::new(),
            items: Vec::new(),
            tokens: Vec::new(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
            deleted_at: value.deleted_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Trash/restore result: just the order row, no relations.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderResponseDeleteAt {
    pub id: i32,
    pub order_id: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    #[serde(rename = "created_at")]
    pub created_at: String,
    #[serde(rename = "updated_at")]
    pub updated_at: String,
    #[serde(rename = "deleted_at")]
    pub deleted_at: Option<String>,
}

impl From<OrderModel> for OrderResponseDeleteAt {
    fn from(value: OrderModel) -> Self {
        OrderResponseDeleteAt {
            id: value.id,
            order_id: value.order_id,
            status: value.status,
            total_amount: value.total_amount,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
            deleted_at: value.deleted_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct OrderStatusCountResponse {
    pub status: OrderStatus,
    pub total: i64,
    pub revenue: Decimal,
}

impl From<OrderStatusCount> for OrderStatusCountResponse {
    fn from(value: OrderStatusCount) -> Self {
        OrderStatusCountResponse {
            status: value.status,
            total: value.total,
            revenue: value.revenue,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderSummaryResponse {
    pub total_orders: i64,
    pub completed_revenue: Decimal,
    pub by_status: Vec<OrderStatusCountResponse>,
}

impl From<Vec<OrderStatusCount>> for OrderSummaryResponse {
    fn from(rows: Vec<OrderStatusCount>) -> Self {
        let total_orders = rows.iter().map(|r| r.total).sum();
        let completed_revenue = rows
            .iter()
            .filter(|r| r.status == OrderStatus::Completed)
            .map(|r| r.revenue)
            .sum();

        OrderSummaryResponse {
            total_orders,
            completed_revenue,
            by_status: rows.into_iter().map(OrderStatusCountResponse::from).collect(),
        }
    }
}
