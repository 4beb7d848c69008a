use crate::model::discount::{Discount as DiscountModel, DiscountType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct DiscountResponse {
    pub id: i32,
    pub name: String,
    pub discount_type: DiscountType,
    pub value: Decimal,
}

impl From<DiscountModel> for DiscountResponse {
    fn from(value: DiscountModel) -> Self {
        DiscountResponse {
            id: value.id,
            name: value.name,
            discount_type: value.discount_type,
            value: value.value,
        }
    }
}
