use crate::model::customer::Customer as CustomerModel;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CustomerResponse {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub loyalty_points: i64,
}

impl From<CustomerModel> for CustomerResponse {
    fn from(value: CustomerModel) -> Self {
        CustomerResponse {
            id: value.id,
            name: value.name,
            phone: value.phone,
            email: value.email,
            loyalty_points: value.loyalty_points,
        }
    }
}
