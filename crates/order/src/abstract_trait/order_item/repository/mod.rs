mod query;

pub use self::query::{DynOrderItemQueryRepository, OrderItemQueryRepositoryTrait};
