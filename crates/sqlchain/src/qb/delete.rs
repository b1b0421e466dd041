//! DELETE statement builder.

use crate::client::RunnerHandle;
use crate::error::{SqlError, SqlResult};
use crate::placeholder::PlaceholderFormat;
use crate::qb::expr::{Fragment, append_clause, append_to_sql};
use crate::qb::snapshot::Snapshot;
use crate::qb::traits::{BuiltQuery, SqlQb};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub(crate) struct DeleteData {
    placeholder_format: PlaceholderFormat,
    runner: Option<RunnerHandle>,
    prefixes: Vec<Fragment>,
    from: String,
    where_parts: Vec<Fragment>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Fragment>,
}

/// Immutable DELETE statement builder.
///
/// A DELETE without WHERE predicates removes every row; nothing guards
/// against that here.
#[derive(Clone, Debug)]
#[must_use]
pub struct DeleteBuilder {
    data: Arc<DeleteData>,
}

impl_snapshot!(DeleteBuilder, DeleteData);

impl DeleteBuilder {
    /// Create a new DELETE builder for `table`.
    pub fn new(table: &str) -> Self {
        Self::default().from(table)
    }

    impl_runner_methods!();
    impl_affix_methods!();
    impl_where_methods!();

    /// Set the table to delete from.
    pub fn from(&self, table: &str) -> Self {
        self.set(|d| &mut d.from, table.to_string())
    }

    /// Add ORDER BY expressions.
    pub fn order_by<S: Into<String>>(&self, order_bys: impl IntoIterator<Item = S>) -> Self {
        self.extend(|d| &mut d.order_bys, order_bys.into_iter().map(Into::into))
    }

    /// Set a LIMIT clause.
    pub fn limit(&self, limit: u64) -> Self {
        self.set(|d| &mut d.limit, Some(limit))
    }

    /// Set an OFFSET clause.
    pub fn offset(&self, offset: u64) -> Self {
        self.set(|d| &mut d.offset, Some(offset))
    }
}

impl SqlQb for DeleteBuilder {
    fn render(&self) -> SqlResult<BuiltQuery> {
        let d = &*self.data;
        if d.from.is_empty() {
            return Err(SqlError::validation("delete statements must specify a From table"));
        }

        let mut sql = String::new();
        let mut params = Vec::new();

        append_to_sql(&d.prefixes, &mut sql, " ", &mut params)?;
        if !sql.is_empty() {
            sql.push(' ');
        }

        sql.push_str("DELETE FROM ");
        sql.push_str(&d.from);

        append_clause(&d.where_parts, &mut sql, " WHERE ", " AND ", &mut params)?;

        if !d.order_bys.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&d.order_bys.join(", "));
        }

        if let Some(limit) = d.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = d.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        append_clause(&d.suffixes, &mut sql, " ", " ", &mut params)?;

        Ok(BuiltQuery::new(sql, params))
    }

    fn format(&self) -> PlaceholderFormat {
        self.data.placeholder_format
    }
}
