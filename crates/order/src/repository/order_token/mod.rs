mod command;
mod query;
mod write;

pub use self::command::OrderTokenCommandRepository;
pub use self::query::OrderTokenQueryRepository;
pub(crate) use self::write::{insert_token_drafts, retire_pending_tokens};
