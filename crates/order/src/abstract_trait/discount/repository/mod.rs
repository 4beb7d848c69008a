mod query;

pub use self::query::{DiscountQueryRepositoryTrait, DynDiscountQueryRepository};
