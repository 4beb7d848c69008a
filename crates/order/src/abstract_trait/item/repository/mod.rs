mod query;

pub use self::query::{DynItemQueryRepository, ItemQueryRepositoryTrait};
