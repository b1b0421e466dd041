//! Trait definitions for query builders.

use crate::client::{RunnerHandle, exec_with, query_row_with, query_with};
use crate::error::{SqlError, SqlResult};
use crate::placeholder::PlaceholderFormat;
use crate::qb::param::{Param, params_ref};
use crate::row::FromRow;
use std::fmt::Write;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// The result of rendering a statement: SQL text plus its ordered arguments.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Param>,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: String, params: Vec<Param>) -> Self {
        Self { sql, params }
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        params_ref(&self.params)
    }
}

/// Base trait for all query builders.
pub trait SqlQb: Sync {
    /// Render with neutral `?` markers, without applying the placeholder format.
    ///
    /// This is what a statement contributes when nested inside another one.
    fn render(&self) -> SqlResult<BuiltQuery>;

    /// Placeholder format applied by [`SqlQb::to_sql`].
    fn format(&self) -> PlaceholderFormat;

    /// Build the final SQL string and bound arguments.
    fn to_sql(&self) -> SqlResult<BuiltQuery> {
        let built = self.render()?;
        let sql = self.format().replace_placeholders(&built.sql)?;
        Ok(BuiltQuery::new(sql, built.params))
    }

    /// Like [`SqlQb::to_sql`], but panics if the statement cannot be built.
    fn must_sql(&self) -> BuiltQuery {
        match self.to_sql() {
            Ok(built) => built,
            Err(e) => panic!("{}", e),
        }
    }

    /// Render with each argument's debug text inlined in place of its marker.
    ///
    /// The output is for logs only; it is not safe to execute.
    fn to_debug_sql(&self) -> SqlResult<String> {
        let built = self.render()?;
        let mut out = String::with_capacity(built.sql.len());
        let mut args = built.params.iter();
        let mut rest = built.sql.as_str();
        while let Some(pos) = rest.find('?') {
            out.push_str(&rest[..pos]);
            if rest[pos + 1..].starts_with('?') {
                out.push('?');
                rest = &rest[pos + 2..];
                continue;
            }
            let Some(arg) = args.next() else {
                return Err(SqlError::validation(format!(
                    "not enough args to replace placeholders in '{}'",
                    built.sql
                )));
            };
            let _ = write!(&mut out, "'{:?}'", arg.0);
            rest = &rest[pos + 1..];
        }
        out.push_str(rest);

        let unused = args.count();
        if unused > 0 {
            return Err(SqlError::validation(format!(
                "{} unused args in '{}'",
                unused, built.sql
            )));
        }
        Ok(out)
    }
}

/// Execution conveniences for builders that carry a runner (`run_with`).
///
/// Every method fails with [`SqlError::RunnerNotSet`] before rendering when
/// no runner is attached.
pub trait RunQb: SqlQb {
    /// The runner attached with `run_with`, if any.
    fn runner(&self) -> Option<&RunnerHandle>;

    /// Execute and return the affected row count.
    fn exec(&self) -> impl std::future::Future<Output = SqlResult<u64>> + Send {
        async move {
            let runner = self.runner().ok_or(SqlError::RunnerNotSet)?;
            exec_with(runner.as_runner(), self).await
        }
    }

    /// Execute and return all rows.
    fn query(&self) -> impl std::future::Future<Output = SqlResult<Vec<Row>>> + Send {
        async move {
            let runner = self.runner().ok_or(SqlError::RunnerNotSet)?;
            query_with(runner.as_runner(), self).await
        }
    }

    /// Execute and return a single row.
    ///
    /// Fails with [`SqlError::RunnerNotQueryRunner`] if the runner cannot
    /// fetch single rows.
    fn query_row(&self) -> impl std::future::Future<Output = SqlResult<Row>> + Send {
        async move {
            let runner = self.runner().ok_or(SqlError::RunnerNotSet)?;
            query_row_with(runner.as_runner(), self).await
        }
    }

    /// Execute and map a single row to `T`.
    fn scan<T: FromRow + Send>(&self) -> impl std::future::Future<Output = SqlResult<T>> + Send {
        async move {
            let row = self.query_row().await?;
            T::from_row(&row)
        }
    }
}
