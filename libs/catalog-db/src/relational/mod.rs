//! Relational backend: SQL compilation, execution and the listing schema.

pub mod exec;
pub mod migration;
pub mod query;

pub use exec::{fetch_page, find_row, insert_row, update_row};
pub use migration::Migrator;
pub use query::{RelationalQuery, like_escape};
