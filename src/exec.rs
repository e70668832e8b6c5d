//! SQL executor facade.
//!
//! [`SqlExec`] dispatches CREATE/DROP/SHOW statements against the schema
//! catalog, enforcing referential consistency between `_tables`,
//! `_columns`, and `_indices`. It is the one place that creates the two
//! catalog singletons; see [`SqlExec::open`].

mod core;
mod error;
mod result;

pub use self::core::SqlExec;
pub use error::ExecError;
pub use result::QueryResult;
