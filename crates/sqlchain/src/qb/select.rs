//! SELECT statement builder.

use crate::client::RunnerHandle;
use crate::error::{SqlError, SqlResult};
use crate::placeholder::PlaceholderFormat;
use crate::qb::expr::{Expr, Fragment, append_clause, append_to_sql};
use crate::qb::snapshot::Snapshot;
use crate::qb::traits::{BuiltQuery, SqlQb};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub(crate) struct SelectData {
    placeholder_format: PlaceholderFormat,
    runner: Option<RunnerHandle>,
    prefixes: Vec<Fragment>,
    options: Vec<String>,
    columns: Vec<Fragment>,
    from: Option<Fragment>,
    joins: Vec<Fragment>,
    where_parts: Vec<Fragment>,
    group_bys: Vec<String>,
    having_parts: Vec<Fragment>,
    order_bys: Vec<Fragment>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Fragment>,
}

/// Immutable SELECT statement builder.
///
/// ```ignore
/// let built = qb::select(["id", "name"])
///     .from("users")
///     .eq("status", "active")
///     .order_by(["id DESC"])
///     .limit(10)
///     .to_sql()?;
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct SelectBuilder {
    data: Arc<SelectData>,
}

impl_snapshot!(SelectBuilder, SelectData);

impl SelectBuilder {
    impl_runner_methods!();
    impl_affix_methods!();
    impl_where_methods!();

    // ==================== Result columns ====================

    /// Add query options such as `DISTINCT` or `SQL_NO_CACHE`.
    pub fn options<S: Into<String>>(&self, options: impl IntoIterator<Item = S>) -> Self {
        self.extend(|d| &mut d.options, options.into_iter().map(Into::into))
    }

    /// Add the `DISTINCT` option.
    pub fn distinct(&self) -> Self {
        self.options(["DISTINCT"])
    }

    /// Add result columns.
    pub fn columns<S: Into<String>>(&self, columns: impl IntoIterator<Item = S>) -> Self {
        self.extend(
            |d| &mut d.columns,
            columns.into_iter().map(|c| Fragment::from(c.into())),
        )
    }

    /// Add a result column that is an expression or a subquery.
    ///
    /// ```ignore
    /// .column(Expr::new("COALESCE(nick, ?) AS nick").bind("anon"))
    /// .column(Fragment::aliased(count_select, "total"))
    /// ```
    pub fn column(&self, column: impl Into<Fragment>) -> Self {
        self.append(|d| &mut d.columns, column.into())
    }

    /// Remove every result column.
    pub fn remove_columns(&self) -> Self {
        self.set(|d| &mut d.columns, Vec::new())
    }

    // ==================== FROM / JOIN ====================

    /// Set the FROM clause.
    pub fn from(&self, from: &str) -> Self {
        self.set(|d| &mut d.from, Some(Fragment::from(from)))
    }

    /// Use a subquery as the FROM source: `FROM (SELECT ...) AS alias`.
    pub fn from_select(&self, from: SelectBuilder, alias: &str) -> Self {
        // Nested markers are numbered once, by this statement.
        let from = from.placeholder_format(PlaceholderFormat::Question);
        self.set(|d| &mut d.from, Some(Fragment::aliased(from, alias)))
    }

    /// Add a complete join clause, e.g. `Expr::new("LEFT JOIN t ON t.x = ?")`.
    pub fn join_clause(&self, join: impl Into<Fragment>) -> Self {
        self.append(|d| &mut d.joins, join.into())
    }

    fn join_kind(&self, kind: &str, join: &str) -> Self {
        self.join_clause(Expr::new(format!("{} {}", kind, join)))
    }

    /// Add `JOIN <join>`.
    pub fn join(&self, join: &str) -> Self {
        self.join_kind("JOIN", join)
    }

    /// Add `LEFT JOIN <join>`.
    pub fn left_join(&self, join: &str) -> Self {
        self.join_kind("LEFT JOIN", join)
    }

    /// Add `RIGHT JOIN <join>`.
    pub fn right_join(&self, join: &str) -> Self {
        self.join_kind("RIGHT JOIN", join)
    }

    /// Add `INNER JOIN <join>`.
    pub fn inner_join(&self, join: &str) -> Self {
        self.join_kind("INNER JOIN", join)
    }

    /// Add `CROSS JOIN <join>`.
    pub fn cross_join(&self, join: &str) -> Self {
        self.join_kind("CROSS JOIN", join)
    }

    // ==================== GROUP BY / HAVING ====================

    /// Add GROUP BY expressions.
    pub fn group_by<S: Into<String>>(&self, group_bys: impl IntoIterator<Item = S>) -> Self {
        self.extend(|d| &mut d.group_bys, group_bys.into_iter().map(Into::into))
    }

    /// Add a HAVING predicate. Predicates are joined with AND.
    pub fn having(&self, pred: impl Into<Fragment>) -> Self {
        self.append(|d| &mut d.having_parts, pred.into())
    }

    // ==================== ORDER BY / LIMIT / OFFSET ====================

    /// Add ORDER BY expressions.
    pub fn order_by<S: Into<String>>(&self, order_bys: impl IntoIterator<Item = S>) -> Self {
        self.extend(
            |d| &mut d.order_bys,
            order_bys.into_iter().map(|o| Fragment::from(o.into())),
        )
    }

    /// Add an ORDER BY expression with bound values.
    pub fn order_by_clause(&self, clause: impl Into<Fragment>) -> Self {
        self.append(|d| &mut d.order_bys, clause.into())
    }

    /// Set a LIMIT clause.
    pub fn limit(&self, limit: u64) -> Self {
        self.set(|d| &mut d.limit, Some(limit))
    }

    /// Remove the LIMIT clause.
    pub fn remove_limit(&self) -> Self {
        self.set(|d| &mut d.limit, None)
    }

    /// Set an OFFSET clause.
    pub fn offset(&self, offset: u64) -> Self {
        self.set(|d| &mut d.offset, Some(offset))
    }

    /// Remove the OFFSET clause.
    pub fn remove_offset(&self) -> Self {
        self.set(|d| &mut d.offset, None)
    }
}

impl SqlQb for SelectBuilder {
    fn render(&self) -> SqlResult<BuiltQuery> {
        let d = &*self.data;
        if d.columns.is_empty() {
            return Err(SqlError::validation(
                "select statements must have at least one result column",
            ));
        }

        let mut sql = String::new();
        let mut params = Vec::new();

        append_to_sql(&d.prefixes, &mut sql, " ", &mut params)?;
        if !sql.is_empty() {
            sql.push(' ');
        }

        sql.push_str("SELECT ");

        if !d.options.is_empty() {
            sql.push_str(&d.options.join(" "));
            sql.push(' ');
        }

        append_to_sql(&d.columns, &mut sql, ", ", &mut params)?;

        if let Some(from) = &d.from {
            sql.push_str(" FROM ");
            from.append_to(&mut sql, &mut params)?;
        }

        append_clause(&d.joins, &mut sql, " ", " ", &mut params)?;

        append_clause(&d.where_parts, &mut sql, " WHERE ", " AND ", &mut params)?;

        if !d.group_bys.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&d.group_bys.join(", "));
        }

        append_clause(&d.having_parts, &mut sql, " HAVING ", " AND ", &mut params)?;

        append_clause(&d.order_bys, &mut sql, " ORDER BY ", ", ", &mut params)?;

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
