mod command;
mod query;

pub use self::command::{DynTableCommandRepository, TableCommandRepositoryTrait};
pub use self::query::{DynTableQueryRepository, TableQueryRepositoryTrait};
