mod command;
mod query;

pub use self::command::{DynOrderTokenCommandRepository, OrderTokenCommandRepositoryTrait};
pub use self::query::{DynOrderTokenQueryRepository, OrderTokenQueryRepositoryTrait};
