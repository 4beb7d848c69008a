pub mod customer;
pub mod discount;
pub mod item;
pub mod order;
pub mod order_item;
pub mod order_token;
pub mod table;
