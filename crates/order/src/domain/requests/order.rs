use crate::{
    domain::requests::{order_token::TokenDraft, order_token::TokenPlan, reference::EntityRef},
    model::order::{OrderStatus, OrderType, PaymentMethod},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative").with_message("must be >= 0".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSortField {
    #[default]
    CreatedAt,
    TotalAmount,
    OrderId,
}

impl OrderSortField {
    pub fn column(self) -> &'static str {
        match self {
            OrderSortField::CreatedAt => "o.created_at",
            OrderSortField::TotalAmount => "o.total_amount",
            OrderSortField::OrderId => "o.order_id",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct FindAllOrder {
    #[serde(default)]
    pub search: String,

    #[validate(range(min = 1))]
    pub page: i32,

    #[validate(range(min = 1, max = 100))]
    #[serde(rename = "page_size")]
    pub page_size: i32,

    #[serde(default)]
    pub status: Option<OrderStatus>,

    #[serde(default)]
    pub order_type: Option<OrderType>,

    #[serde(default)]
    pub customer_id: Option<i32>,

    #[serde(default)]
    pub table_id: Option<i32>,

    #[serde(default)]
    pub sort_by: OrderSortField,

    #[serde(default)]
    pub sort_order: SortDirection,
}

impl Default for FindAllOrder {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            page_size: 10,
            status: None,
            order_type: None,
            customer_id: None,
            table_id: None,
            sort_by: OrderSortField::default(),
            sort_order: SortDirection::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct OrderItemRequest {
    /// Present when the line already exists on the order.
    #[serde(default)]
    pub id: Option<i32>,

    #[validate(range(min = 1))]
    #[serde(rename = "item_id")]
    pub item_id: i32,

    #[serde(default)]
    pub variation_id: Option<i32>,

    #[validate(range(min = 1))]
    pub quantity: i32,

    #[validate(custom(function = "non_negative_amount"))]
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateOrderRequest {
    pub order_type: OrderType,

    #[serde(default)]
    pub tables: Vec<EntityRef>,

    #[serde(default)]
    pub customer: Option<EntityRef>,

    #[serde(default)]
    pub user_id: Option<i32>,

    #[serde(default)]
    pub discount: Option<EntityRef>,

    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,

    #[validate(length(min = 1, message = "an order needs at least one item"), nested)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct UpdateOrderRequest {
    #[serde(rename = "id")]
    pub id: i32,

    #[serde(default)]
    pub order_type: Option<OrderType>,

    #[serde(default)]
    pub status: Option<OrderStatus>,

    #[serde(default)]
    pub tables: Option<Vec<EntityRef>>,

    #[serde(default)]
    pub customer: Option<EntityRef>,

    #[serde(default)]
    pub user_id: Option<i32>,

    #[serde(default)]
    pub discount: Option<EntityRef>,

    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,

    #[validate(nested)]
    #[serde(default)]
    pub items: Option<Vec<OrderItemRequest>>,

    /// Currency amount of loyalty credit spent when this update completes the order.
    #[validate(custom(function = "non_negative_amount"))]
    #[serde(default)]
    pub redeem_amount: Option<Decimal>,
}

impl UpdateOrderRequest {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            order_type: None,
            status: None,
            tables: None,
            customer: None,
            user_id: None,
            discount: None,
            payment_method: None,
            items: None,
            redeem_amount: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRecord {
    pub id: Option<i32>,
    pub item_id: i32,
    pub variation_id: Option<i32>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Final item list of an order; lines with an id are updated, the rest inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemReconciliation {
    pub items: Vec<OrderItemRecord>,
    pub removed_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderRecordRequest {
    pub order_id: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub customer_id: Option<i32>,
    pub user_id: Option<i32>,
    pub discount_id: Option<i32>,
    pub table_ids: Vec<i32>,
    pub items: Vec<OrderItemRecord>,
    pub tokens: Vec<TokenDraft>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpdateOrderRecordRequest {
    pub id: i32,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub completion_duration: Option<i32>,
    pub customer_id: Option<i32>,
    pub user_id: Option<i32>,
    pub discount_id: Option<i32>,
    pub table_ids: Option<Vec<i32>>,
    pub items: Option<ItemReconciliation>,
    pub tokens: TokenPlan,
    pub updated_at: DateTime<Utc>,
}
