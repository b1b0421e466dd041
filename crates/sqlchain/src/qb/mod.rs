//! Immutable statement builders.
//!
//! Every builder is a cheap handle to a shared snapshot. Chained calls return
//! a new builder and never modify the receiver, so a partially built
//! statement can be reused as a template:
//!
//! ```ignore
//! use sqlchain::qb;
//! use sqlchain::{PlaceholderFormat, SqlQb};
//!
//! let active = qb::select(["id", "name"]).from("users").eq("active", true);
//!
//! let page = active.order_by(["id"]).limit(20).offset(40);
//! let admins = active.eq("role", "admin");
//!
//! // UPDATE users SET status = $1 WHERE id = $2
//! let built = qb::update("users")
//!     .set("status", "inactive")
//!     .eq("id", 7_i64)
//!     .placeholder_format(PlaceholderFormat::Dollar)
//!     .to_sql()?;
//! ```
//!
//! Any statement can be nested inside another (as a SET value, a FROM
//! source, a CTE body, a predicate). Nested statements contribute neutral
//! `?` markers; the outermost statement numbers them in one pass.

#[macro_use]
mod macros;

mod cte;
mod delete;
mod expr;
mod insert;
mod param;
mod select;
mod snapshot;
mod statement;
mod traits;
mod update;

pub use cte::CteBuilder;
pub use delete::DeleteBuilder;
pub use expr::{Conj, Expr, Fragment, Statement};
pub use insert::InsertBuilder;
pub use param::{Param, params_ref};
pub use select::SelectBuilder;
pub use statement::StatementBuilder;
pub use traits::{BuiltQuery, RunQb, SqlQb};
pub use update::{SetValue, UpdateBuilder};

use crate::placeholder::PlaceholderFormat;

/// Create a SELECT builder with the given result columns.
///
/// # Example
/// ```ignore
/// let qb = sqlchain::qb::select(["id", "name"]).from("users").eq("id", 1);
/// ```
pub fn select<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> SelectBuilder {
    SelectBuilder::default().columns(columns)
}

/// Create an INSERT builder for the given table.
///
/// # Example
/// ```ignore
/// let qb = sqlchain::qb::insert("users")
///     .columns(["username", "email"])
///     .values([SetValue::value("alice"), SetValue::value("alice@example.com")]);
/// ```
pub fn insert(table: &str) -> InsertBuilder {
    InsertBuilder::new(table)
}

/// Create a REPLACE builder for the given table.
pub fn replace(table: &str) -> InsertBuilder {
    InsertBuilder::replace(table)
}

/// Create an UPDATE builder for the given table.
///
/// # Example
/// ```ignore
/// let qb = sqlchain::qb::update("users")
///     .set("status", "inactive")
///     .eq("id", user_id);
/// ```
pub fn update(table: &str) -> UpdateBuilder {
    UpdateBuilder::new(table)
}

/// Create a DELETE builder for the given table.
///
/// There is no implicit guard: without predicates every row is deleted.
pub fn delete(table: &str) -> DeleteBuilder {
    DeleteBuilder::new(table)
}

/// Start a `WITH` statement.
pub fn with() -> CteBuilder {
    CteBuilder::default()
}

/// A [`StatementBuilder`] preset to Postgres `$n` placeholders.
pub fn psql() -> StatementBuilder {
    StatementBuilder::new().placeholder_format(PlaceholderFormat::Dollar)
}

#[cfg(test)]
mod tests;
