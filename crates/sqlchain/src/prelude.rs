//! Convenient imports for typical `sqlchain` usage.
//!
//! ```ignore
//! use sqlchain::prelude::*;
//! ```

pub use crate::{
    Expr, Fragment, FromRow, PlaceholderFormat, RowExt, RunQb, Runner, SetValue, SqlError,
    SqlQb, SqlResult,
};
