pub mod order;
pub mod order_token;
pub mod reference;
