mod assembler;
pub mod cache;
mod command;
mod query;

pub use self::assembler::{OrderAssembler, OrderAssemblerDeps};
pub use self::command::{OrderCommandService, OrderCommandServiceDeps};
pub use self::query::OrderQueryService;
