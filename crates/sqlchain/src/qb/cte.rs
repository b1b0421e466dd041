//! Common Table Expressions (`WITH ... AS (...)`).
//!
//! A [`CteBuilder`] collects named sub-statements and finishes with exactly
//! one terminal statement:
//!
//! ```ignore
//! let built = qb::with()
//!     .cte("active")
//!     .as_(qb::select(["id"]).from("users").eq("active", true))
//!     .select(qb::select(["count(*)"]).from("active"))
//!     .placeholder_format(PlaceholderFormat::Dollar)
//!     .to_sql()?;
//! // WITH active AS (SELECT id FROM users WHERE active = $1) SELECT count(*) FROM active
//! ```

use crate::client::RunnerHandle;
use crate::error::{SqlError, SqlResult};
use crate::placeholder::PlaceholderFormat;
use crate::qb::delete::DeleteBuilder;
use crate::qb::expr::{Fragment, Statement, append_to_sql};
use crate::qb::insert::InsertBuilder;
use crate::qb::select::SelectBuilder;
use crate::qb::snapshot::Snapshot;
use crate::qb::traits::{BuiltQuery, SqlQb};
use crate::qb::update::UpdateBuilder;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct CteEntry {
    name: Option<String>,
    statement: Statement,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CteData {
    placeholder_format: PlaceholderFormat,
    runner: Option<RunnerHandle>,
    recursive: bool,
    current_cte_name: Option<String>,
    ctes: Vec<CteEntry>,
    statement: Option<Statement>,
}

/// Immutable builder for a `WITH` statement.
#[derive(Clone, Debug)]
#[must_use]
pub struct CteBuilder {
    data: Arc<CteData>,
}

impl_snapshot!(CteBuilder, CteData);

impl CteBuilder {
    impl_runner_methods!();

    /// Render `WITH RECURSIVE` instead of `WITH`.
    pub fn recursive(&self, recursive: bool) -> Self {
        self.set(|d| &mut d.recursive, recursive)
    }

    /// Start a new CTE named `name`; the next [`as_`](Self::as_) supplies its body.
    pub fn cte(&self, name: &str) -> Self {
        self.set(|d| &mut d.current_cte_name, Some(name.to_string()))
    }

    /// Supply the body of the CTE started by [`cte`](Self::cte).
    ///
    /// Calling this without a pending name is reported when the statement is
    /// rendered.
    pub fn as_(&self, statement: impl Into<Statement>) -> Self {
        let statement = statement
            .into()
            .with_placeholder_format(PlaceholderFormat::Question);
        self.derive(|d| {
            let name = d.current_cte_name.take();
            d.ctes.push(CteEntry { name, statement });
        })
    }

    /// Finish with a SELECT.
    pub fn select(&self, statement: SelectBuilder) -> Self {
        self.terminal(statement.into())
    }

    /// Finish with an INSERT.
    pub fn insert(&self, statement: InsertBuilder) -> Self {
        self.terminal(statement.into())
    }

    /// Finish with a REPLACE (an [`InsertBuilder`] created by `qb::replace`).
    pub fn replace(&self, statement: InsertBuilder) -> Self {
        self.insert(statement)
    }

    /// Finish with an UPDATE.
    pub fn update(&self, statement: UpdateBuilder) -> Self {
        self.terminal(statement.into())
    }

    /// Finish with a DELETE.
    pub fn delete(&self, statement: DeleteBuilder) -> Self {
        self.terminal(statement.into())
    }

    fn terminal(&self, statement: Statement) -> Self {
        self.set(|d| &mut d.statement, Some(statement))
    }
}

impl SqlQb for CteBuilder {
    fn render(&self) -> SqlResult<BuiltQuery> {
        let d = &*self.data;
        if d.ctes.is_empty() {
            return Err(SqlError::validation(
                "common table expressions statements must have at least one label and subquery",
            ));
        }
        let Some(statement) = &d.statement else {
            return Err(SqlError::validation(
                "common table expressions must have one of the following final statements: \
                 (select, insert, replace, update, delete)",
            ));
        };

        let mut ctes = Vec::with_capacity(d.ctes.len());
        for (i, entry) in d.ctes.iter().enumerate() {
            let Some(name) = &entry.name else {
                return Err(SqlError::validation(format!(
                    "common table expression #{} has no name (call cte before as_)",
                    i + 1
                )));
            };
            ctes.push(Fragment::Cte {
                name: name.clone(),
                statement: entry.statement.clone(),
            });
        }

        let mut sql = String::from("WITH ");
        let mut params = Vec::new();

        if d.recursive {
            sql.push_str("RECURSIVE ");
        }

        append_to_sql(&ctes, &mut sql, ", ", &mut params)?;

        sql.push(' ');
        let built = statement.render()?;
        sql.push_str(&built.sql);
        params.extend(built.params);

        Ok(BuiltQuery::new(sql, params))
    }

    fn format(&self) -> PlaceholderFormat {
        self.data.placeholder_format
    }
}
