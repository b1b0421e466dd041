//! Statement factory carrying shared defaults.

use crate::client::RunnerHandle;
use crate::placeholder::PlaceholderFormat;
use crate::qb::cte::CteBuilder;
use crate::qb::delete::DeleteBuilder;
use crate::qb::insert::InsertBuilder;
use crate::qb::select::SelectBuilder;
use crate::qb::update::UpdateBuilder;

macro_rules! with_defaults {
    ($sb:expr, $builder:expr) => {{
        let b = $builder.placeholder_format($sb.placeholder_format);
        match &$sb.runner {
            Some(r) => b.run_with(r.clone()),
            None => b,
        }
    }};
}

/// Creates statement builders that start with a common placeholder format
/// and runner.
///
/// ```ignore
/// let sb = StatementBuilder::new()
///     .placeholder_format(PlaceholderFormat::Dollar)
///     .run_with(Arc::new(client));
///
/// sb.update("users").set("active", false).eq("id", 7_i64).exec().await?;
/// ```
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct StatementBuilder {
    placeholder_format: PlaceholderFormat,
    runner: Option<RunnerHandle>,
}

impl StatementBuilder {
    /// Factory with the `Question` format and no runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder format given to every statement created from now on.
    pub fn placeholder_format(&self, format: PlaceholderFormat) -> Self {
        Self {
            placeholder_format: format,
            runner: self.runner.clone(),
        }
    }

    /// Runner given to every statement created from now on.
    pub fn run_with(&self, runner: impl Into<RunnerHandle>) -> Self {
        Self {
            placeholder_format: self.placeholder_format,
            runner: Some(runner.into()),
        }
    }

    /// Placeholder format new statements start with.
    pub fn format(&self) -> PlaceholderFormat {
        self.placeholder_format
    }

    /// SELECT with the given result columns.
    pub fn select<S: Into<String>>(&self, columns: impl IntoIterator<Item = S>) -> SelectBuilder {
        with_defaults!(self, SelectBuilder::default().columns(columns))
    }

    /// INSERT INTO `table`.
    pub fn insert(&self, table: &str) -> InsertBuilder {
        with_defaults!(self, InsertBuilder::new(table))
    }

    /// REPLACE INTO `table`.
    pub fn replace(&self, table: &str) -> InsertBuilder {
        with_defaults!(self, InsertBuilder::replace(table))
    }

    /// UPDATE `table`.
    pub fn update(&self, table: &str) -> UpdateBuilder {
        with_defaults!(self, UpdateBuilder::new(table))
    }

    /// DELETE FROM `table`.
    pub fn delete(&self, table: &str) -> DeleteBuilder {
        with_defaults!(self, DeleteBuilder::new(table))
    }

    /// An empty `WITH` statement.
    pub fn with(&self) -> CteBuilder {
        with_defaults!(self, CteBuilder::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::{RunQb, SqlQb, psql};

    #[test]
    fn test_default_is_question() {
        let sb = StatementBuilder::new();
        assert_eq!(sb.format(), PlaceholderFormat::Question);
        let built = sb.delete("t").eq("id", 1i32).to_sql().unwrap();
        assert_eq!(built.sql, "DELETE FROM t WHERE id = ?");
    }

    #[test]
    fn test_psql_uses_dollar() {
        let built = psql()
            .update("users")
            .set("name", "x")
            .eq("id", 2i64)
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, "UPDATE users SET name = $1 WHERE id = $2");

        let built = psql().select(["id"]).from("t").eq("a", 1i32).to_sql().unwrap();
        assert_eq!(built.sql, "SELECT id FROM t WHERE a = $1");
    }

    #[test]
    fn test_factory_is_immutable() {
        let base = StatementBuilder::new();
        let dollar = base.placeholder_format(PlaceholderFormat::Dollar);
        assert_eq!(base.format(), PlaceholderFormat::Question);
        assert_eq!(dollar.format(), PlaceholderFormat::Dollar);
    }

    #[test]
    fn test_no_runner_by_default() {
        let sb = StatementBuilder::new();
        assert!(sb.update("t").runner().is_none());
        assert!(sb.with().runner().is_none());
    }
}
