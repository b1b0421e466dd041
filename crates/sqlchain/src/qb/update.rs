//! UPDATE statement builder.

use crate::client::RunnerHandle;
use crate::error::{SqlError, SqlResult};
use crate::placeholder::PlaceholderFormat;
use crate::qb::expr::{Expr, Fragment, append_clause, append_to_sql};
use crate::qb::param::Param;
use crate::qb::select::SelectBuilder;
use crate::qb::snapshot::Snapshot;
use crate::qb::traits::{BuiltQuery, SqlQb};
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Right-hand side of a SET assignment or an INSERT cell.
#[derive(Clone, Debug)]
pub enum SetValue {
    /// Bound as `?`.
    Value(Param),
    /// Spliced in as SQL (a SELECT is parenthesized).
    Fragment(Fragment),
}

impl SetValue {
    /// Wrap a plain value to be bound as a parameter.
    pub fn value<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        SetValue::Value(Param::new(value))
    }

    pub(crate) fn append_to(&self, sql: &mut String, params: &mut Vec<Param>) -> SqlResult<()> {
        match self {
            SetValue::Value(param) => {
                sql.push('?');
                params.push(param.clone());
                Ok(())
            }
            SetValue::Fragment(fragment) => fragment.append_as_value(sql, params),
        }
    }
}

impl From<Param> for SetValue {
    fn from(p: Param) -> Self {
        SetValue::Value(p)
    }
}

impl From<Fragment> for SetValue {
    fn from(f: Fragment) -> Self {
        SetValue::Fragment(f)
    }
}

impl From<Expr> for SetValue {
    fn from(e: Expr) -> Self {
        SetValue::Fragment(e.into())
    }
}

impl From<SelectBuilder> for SetValue {
    fn from(b: SelectBuilder) -> Self {
        SetValue::Fragment(b.into())
    }
}

#[derive(Clone, Debug)]
struct SetClause {
    column: String,
    value: SetValue,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct UpdateData {
    placeholder_format: PlaceholderFormat,
    runner: Option<RunnerHandle>,
    prefixes: Vec<Fragment>,
    table: String,
    set_clauses: Vec<SetClause>,
    from: Option<Fragment>,
    where_parts: Vec<Fragment>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Fragment>,
}

/// Immutable UPDATE statement builder.
///
/// Every method returns a new builder; the receiver is left unchanged.
///
/// ```ignore
/// let built = qb::update("users")
///     .set("status", "inactive")
///     .eq("id", 7_i64)
///     .placeholder_format(PlaceholderFormat::Dollar)
///     .to_sql()?;
/// assert_eq!(built.sql, "UPDATE users SET status = $1 WHERE id = $2");
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct UpdateBuilder {
    data: Arc<UpdateData>,
}

impl_snapshot!(UpdateBuilder, UpdateData);

impl UpdateBuilder {
    /// Create a new UPDATE builder for `table`.
    pub fn new(table: &str) -> Self {
        Self::default().table(table)
    }

    impl_runner_methods!();
    impl_affix_methods!();
    impl_where_methods!();

    /// Set the table to be updated.
    pub fn table(&self, table: &str) -> Self {
        self.set_field(|d| &mut d.table, table.to_string())
    }

    /// Add `column = ?` with `value` bound.
    pub fn set<T: ToSql + Send + Sync + 'static>(&self, column: &str, value: T) -> Self {
        self.set_value(column, SetValue::value(value))
    }

    /// Add `column = <expr>`; a SELECT renders as `column = (SELECT ...)`.
    pub fn set_expr(&self, column: &str, expr: impl Into<Fragment>) -> Self {
        self.set_value(column, SetValue::Fragment(expr.into()))
    }

    /// Add a SET clause from an explicit [`SetValue`].
    pub fn set_value(&self, column: &str, value: impl Into<SetValue>) -> Self {
        self.append(
            |d| &mut d.set_clauses,
            SetClause {
                column: column.to_string(),
                value: value.into(),
            },
        )
    }

    /// Set a JSON column from any serializable value.
    pub fn set_json<T: serde::Serialize>(&self, column: &str, value: &T) -> serde_json::Result<Self> {
        let json_val = serde_json::to_value(value)?;
        Ok(self.set(column, json_val))
    }

    /// Add one SET clause per entry, ordered by column name so the rendered
    /// SQL and argument order do not depend on map iteration order.
    pub fn set_map<K, V>(&self, clauses: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<SetValue>,
    {
        let mut clauses: Vec<SetClause> = clauses
            .into_iter()
            .map(|(column, value)| SetClause {
                column: column.into(),
                value: value.into(),
            })
            .collect();
        clauses.sort_by(|a, b| a.column.cmp(&b.column));
        self.extend(|d| &mut d.set_clauses, clauses)
    }

    /// Add a FROM clause (Postgres `UPDATE ... FROM`).
    pub fn from(&self, from: &str) -> Self {
        self.set_field(|d| &mut d.from, Some(Fragment::from(from)))
    }

    /// Use a subquery as the FROM source: `FROM (SELECT ...) AS alias`.
    pub fn from_select(&self, from: SelectBuilder, alias: &str) -> Self {
        // Nested markers are numbered once, by this statement.
        let from = from.placeholder_format(PlaceholderFormat::Question);
        self.set_field(|d| &mut d.from, Some(Fragment::aliased(from, alias)))
    }

    /// Add ORDER BY expressions.
    pub fn order_by<S: Into<String>>(&self, order_bys: impl IntoIterator<Item = S>) -> Self {
        self.extend(|d| &mut d.order_bys, order_bys.into_iter().map(Into::into))
    }

    /// Set a LIMIT clause.
    pub fn limit(&self, limit: u64) -> Self {
        self.set_field(|d| &mut d.limit, Some(limit))
    }

    /// Set an OFFSET clause.
    pub fn offset(&self, offset: u64) -> Self {
        self.set_field(|d| &mut d.offset, Some(offset))
    }

    // `set` is taken by the SET clause API.
    fn set_field<V>(&self, field: impl FnOnce(&mut UpdateData) -> &mut V, value: V) -> Self {
        Snapshot::set(self, field, value)
    }
}

impl SqlQb for UpdateBuilder {
    fn render(&self) -> SqlResult<BuiltQuery> {
        let d = &*self.data;
        if d.table.is_empty() {
            return Err(SqlError::validation("update statements must specify a table"));
        }
        if d.set_clauses.is_empty() {
            return Err(SqlError::validation(
                "update statements must have at least one Set clause",
            ));
        }

        let mut sql = String::new();
        let mut params = Vec::new();

        append_to_sql(&d.prefixes, &mut sql, " ", &mut params)?;
        if !sql.is_empty() {
            sql.push(' ');
        }

        sql.push_str("UPDATE ");
        sql.push_str(&d.table);

        sql.push_str(" SET ");
        for (i, clause) in d.set_clauses.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&clause.column);
            sql.push_str(" = ");
            clause.value.append_to(&mut sql, &mut params)?;
        }

        if let Some(from) = &d.from {
            sql.push_str(" FROM ");
            from.append_to(&mut sql, &mut params)?;
        }

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
