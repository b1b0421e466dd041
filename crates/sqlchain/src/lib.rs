//! # sqlchain
//!
//! Immutable, composable SQL statement builders.
//!
//! ## Features
//!
//! - **Immutable builders**: every chained call returns a new snapshot; earlier
//!   snapshots keep rendering exactly what they rendered before
//! - **Composable**: statements nest as SET values, FROM sources, predicates
//!   and CTE bodies, with arguments spliced in text order
//! - **Dialect-aware placeholders**: `?`, `$1`, `:1` or `@p1`, numbered once
//!   for the whole statement; `??` escapes a literal `?` in numbered dialects
//! - **Optional execution**: attach a [`Runner`] (a `tokio-postgres` client,
//!   transaction or pooled client) and call `exec` / `query` / `query_row`
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use sqlchain::qb;
//! use sqlchain::prelude::*;
//!
//! // SELECT id, name FROM users WHERE status = $1 ORDER BY id LIMIT 10
//! let built = qb::select(["id", "name"])
//!     .from("users")
//!     .eq("status", "active")
//!     .order_by(["id"])
//!     .limit(10)
//!     .placeholder_format(PlaceholderFormat::Dollar)
//!     .to_sql()?;
//!
//! // Run through an attached client
//! let affected = qb::psql()
//!     .run_with(Arc::new(client))
//!     .update("users")
//!     .set("status", "inactive")
//!     .eq("id", user_id)
//!     .exec()
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod placeholder;
pub mod prelude;
pub mod qb;
pub mod row;

pub use client::{QueryRower, Runner, RunnerHandle, exec_with, query_row_with, query_with};
pub use error::{SqlError, SqlResult};
pub use placeholder::PlaceholderFormat;
pub use row::{FromRow, RowExt};

// Re-export qb module for easy access
pub use qb::{
    BuiltQuery, CteBuilder, DeleteBuilder, Expr, Fragment, InsertBuilder, Param, RunQb,
    SelectBuilder, SetValue, SqlQb, Statement, StatementBuilder, UpdateBuilder, delete, insert,
    psql, replace, select, update, with,
};
