use crate::model::table::{Table as TableModel, TableStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct TableResponse {
    pub id: i32,
    pub table_number: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub status: TableStatus,
}

impl From<TableModel> for TableResponse {
    fn from(value: TableModel) -> Self {
        TableResponse {
            id: value.id,
            table_number: value.table_number,
            capacity: value.capacity,
            location: value.location,
            status: value.status,
        }
    }
}
