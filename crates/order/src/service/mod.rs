pub mod counters;
pub mod discount;
pub mod loyalty;
pub mod order;
pub mod table;
pub mod token;
