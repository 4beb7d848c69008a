use crate::model::order_token::StationType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "category_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
    Bar,
    Kitchen,
    Other,
}

impl CategoryType {
    /// Station that prepares items of this category, if any.
    pub fn station(self) -> Option<StationType> {
        match self {
            CategoryType::Bar => Some(StationType::Bar),
            CategoryType::Kitchen => Some(StationType::Kitchen),
            CategoryType::Other => None,
        }
    }
}

/// Menu item joined with its category classification.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MenuItem {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub category_id: i32,
    pub category_type: CategoryType,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItemVariation {
    pub id: i32,
    pub item_id: i32,
    pub name: String,
    pub price: Decimal,
}
