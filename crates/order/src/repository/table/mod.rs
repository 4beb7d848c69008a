mod command;
mod query;

pub use self::command::TableCommandRepository;
pub use self::query::TableQueryRepository;
