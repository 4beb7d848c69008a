pub mod api;
pub mod customer;
pub mod discount;
pub mod order;
pub mod order_item;
pub mod order_token;
pub mod pagination;
pub mod table;
