mod command;
mod query;

pub use self::command::CustomerCommandRepository;
pub use self::query::CustomerQueryRepository;
