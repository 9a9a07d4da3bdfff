//! Rich queries over stored records.
//!
//! - `parser`: query text to [`Query`]
//! - `filter`: evaluating a [`Query`] against a JSON document
//! - `plan`: choosing index access paths and running the query on a stub

pub mod filter;
pub mod parser;
pub mod plan;

pub use parser::{Clause, Condition, Op, Operand, Query, QueryError};
pub use plan::{Access, Executor, QueryMode};
