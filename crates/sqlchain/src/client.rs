//! Execution capability consumed by the builders.
//!
//! sqlchain never talks to a database itself. A [`Runner`] is anything that
//! can run rendered SQL with bound arguments; builders hold one (via
//! `run_with`) only to offer `exec` / `query` / `query_row` shortcuts.
//!
//! Runners are object safe so a builder can carry one as a plain value. They
//! are implemented for `tokio_postgres::Client`, `tokio_postgres::Transaction`
//! and, with the `pool` feature, `deadpool_postgres::Client`.

use crate::error::{SqlError, SqlResult};
use crate::qb::{BuiltQuery, SqlQb};
use futures_util::TryStreamExt;
use std::pin::pin;
use std::sync::Arc;
use tokio_postgres::{Row, RowStream};
use tokio_postgres::types::ToSql;

/// Runs SQL for side effects or for rows.
#[async_trait::async_trait]
pub trait Runner: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<u64>;

    /// Execute a query and return all rows.
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Vec<Row>>;

    /// Single-row access, if this runner supports it.
    fn as_query_rower(&self) -> Option<&dyn QueryRower> {
        None
    }
}

/// A [`Runner`] that can also fetch exactly one row.
#[async_trait::async_trait]
pub trait QueryRower: Runner {
    /// Execute a query and return its first row.
    ///
    /// Returns [`SqlError::NotFound`] when the query yields no rows.
    async fn query_row(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Row>;
}

/// Shared handle to a runner, stored inside builder snapshots.
#[derive(Clone)]
pub struct RunnerHandle(Arc<dyn Runner>);

impl RunnerHandle {
    /// Wrap a runner.
    pub fn new<R: Runner + 'static>(runner: R) -> Self {
        Self(Arc::new(runner))
    }

    /// Wrap an already shared runner.
    pub fn from_arc(runner: Arc<dyn Runner>) -> Self {
        Self(runner)
    }

    /// Borrow the runner.
    pub fn as_runner(&self) -> &dyn Runner {
        &*self.0
    }
}

impl<R: Runner + 'static> From<Arc<R>> for RunnerHandle {
    fn from(runner: Arc<R>) -> Self {
        Self(runner)
    }
}

impl std::fmt::Debug for RunnerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RunnerHandle").field(&"<dyn Runner>").finish()
    }
}

#[cfg(feature = "tracing")]
fn trace_sql(kind: &'static str, built: &BuiltQuery) {
    tracing::debug!(
        target: "sqlchain.sql",
        kind,
        param_count = built.params.len(),
        sql = %built.sql,
        "executing statement"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_sql(_kind: &'static str, _built: &BuiltQuery) {}

/// Render `qb` and execute it with `runner` for its side effect.
pub async fn exec_with<R, Q>(runner: &R, qb: &Q) -> SqlResult<u64>
where
    R: Runner + ?Sized,
    Q: SqlQb + ?Sized,
{
    let built = qb.to_sql()?;
    trace_sql("exec", &built);
    runner.execute(&built.sql, &built.params_ref()).await
}

/// Render `qb` and execute it with `runner`, returning all rows.
pub async fn query_with<R, Q>(runner: &R, qb: &Q) -> SqlResult<Vec<Row>>
where
    R: Runner + ?Sized,
    Q: SqlQb + ?Sized,
{
    let built = qb.to_sql()?;
    trace_sql("query", &built);
    runner.query(&built.sql, &built.params_ref()).await
}

/// Render `qb` and fetch a single row with `runner`.
///
/// Fails with [`SqlError::RunnerNotQueryRunner`] before rendering if `runner`
/// has no single-row support.
pub async fn query_row_with<R, Q>(runner: &R, qb: &Q) -> SqlResult<Row>
where
    R: Runner + ?Sized,
    Q: SqlQb + ?Sized,
{
    let rower = runner
        .as_query_rower()
        .ok_or(SqlError::RunnerNotQueryRunner)?;
    let built = qb.to_sql()?;
    trace_sql("query_row", &built);
    rower.query_row(&built.sql, &built.params_ref()).await
}

/// Take the first row of a raw stream; later rows are never decoded.
async fn first_row(stream: RowStream) -> SqlResult<Row> {
    let mut stream = pin!(stream);
    stream
        .try_next()
        .await
        .map_err(SqlError::from_db_error)?
        .ok_or_else(|| SqlError::not_found("Expected one row, got none"))
}

#[async_trait::async_trait]
impl Runner for tokio_postgres::Client {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(SqlError::from_db_error)
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(SqlError::from_db_error)
    }

    fn as_query_rower(&self) -> Option<&dyn QueryRower> {
        Some(self)
    }
}

#[async_trait::async_trait]
impl QueryRower for tokio_postgres::Client {
    async fn query_row(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Row> {
        let stream = tokio_postgres::Client::query_raw(self, sql, params.iter().copied())
            .await
            .map_err(SqlError::from_db_error)?;
        first_row(stream).await
    }
}

#[async_trait::async_trait]
impl<'a> Runner for tokio_postgres::Transaction<'a> {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(SqlError::from_db_error)
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(SqlError::from_db_error)
    }

    fn as_query_rower(&self) -> Option<&dyn QueryRower> {
        Some(self)
    }
}

#[async_trait::async_trait]
impl<'a> QueryRower for tokio_postgres::Transaction<'a> {
    async fn query_row(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Row> {
        let stream = tokio_postgres::Transaction::query_raw(self, sql, params.iter().copied())
            .await
            .map_err(SqlError::from_db_error)?;
        first_row(stream).await
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
#[async_trait::async_trait]
impl Runner for deadpool_postgres::Client {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<u64> {
        // Delegate to the deref target (tokio_postgres::Client).
        let client: &tokio_postgres::Client = self;
        Runner::execute(client, sql, params).await
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Vec<Row>> {
        let client: &tokio_postgres::Client = self;
        Runner::query(client, sql, params).await
    }

    fn as_query_rower(&self) -> Option<&dyn QueryRower> {
        Some(self)
    }
}

#[cfg(feature = "pool")]
#[async_trait::async_trait]
impl QueryRower for deadpool_postgres::Client {
    async fn query_row(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SqlResult<Row> {
        let client: &tokio_postgres::Client = self;
        QueryRower::query_row(client, sql, params).await
    }
}
