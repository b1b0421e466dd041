//! INSERT / REPLACE statement builder.

use crate::client::RunnerHandle;
use crate::error::{SqlError, SqlResult};
use crate::placeholder::PlaceholderFormat;
use crate::qb::expr::{Fragment, append_clause, append_to_sql};
use crate::qb::select::SelectBuilder;
use crate::qb::snapshot::Snapshot;
use crate::qb::traits::{BuiltQuery, SqlQb};
use crate::qb::update::SetValue;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Verb {
    #[default]
    Insert,
    Replace,
}

impl Verb {
    fn keyword(self) -> &'static str {
        match self {
            Verb::Insert => "INSERT",
            Verb::Replace => "REPLACE",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct InsertData {
    placeholder_format: PlaceholderFormat,
    runner: Option<RunnerHandle>,
    prefixes: Vec<Fragment>,
    verb: Verb,
    options: Vec<String>,
    table: String,
    columns: Vec<String>,
    values: Vec<Vec<SetValue>>,
    select: Option<SelectBuilder>,
    suffixes: Vec<Fragment>,
}

/// Immutable INSERT (or REPLACE) statement builder.
///
/// ```ignore
/// let built = qb::insert("users")
///     .columns(["name", "email"])
///     .values([SetValue::value("alice"), SetValue::value("a@example.com")])
///     .suffix("RETURNING id")
///     .to_sql()?;
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct InsertBuilder {
    data: Arc<InsertData>,
}

impl_snapshot!(InsertBuilder, InsertData);

impl InsertBuilder {
    /// Create a new INSERT builder for `table`.
    pub fn new(table: &str) -> Self {
        Self::default().table(table)
    }

    /// Create a new REPLACE builder for `table`.
    pub fn replace(table: &str) -> Self {
        Self::default()
            .set(|d| &mut d.verb, Verb::Replace)
            .table(table)
    }

    impl_runner_methods!();
    impl_affix_methods!();

    /// Add keywords between the verb and `INTO`, e.g. `IGNORE`.
    pub fn options<S: Into<String>>(&self, options: impl IntoIterator<Item = S>) -> Self {
        self.extend(|d| &mut d.options, options.into_iter().map(Into::into))
    }

    /// Set the target table (`INSERT INTO <table>`).
    pub fn table(&self, table: &str) -> Self {
        self.set(|d| &mut d.table, table.to_string())
    }

    /// Add target columns.
    pub fn columns<S: Into<String>>(&self, columns: impl IntoIterator<Item = S>) -> Self {
        self.extend(|d| &mut d.columns, columns.into_iter().map(Into::into))
    }

    /// Add one row of values.
    ///
    /// Plain values ([`SetValue::Value`]) render as `?`; fragments are spliced
    /// in, and a SELECT is parenthesized.
    pub fn values<V: Into<SetValue>>(&self, row: impl IntoIterator<Item = V>) -> Self {
        let row: Vec<SetValue> = row.into_iter().map(Into::into).collect();
        self.append(|d| &mut d.values, row)
    }

    /// Replace the columns and values with the entries of `clauses`, ordered by
    /// column name, as a single row.
    pub fn set_map<K, V>(&self, clauses: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<SetValue>,
    {
        let mut entries: Vec<(String, SetValue)> = clauses
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let (columns, row): (Vec<String>, Vec<SetValue>) = entries.into_iter().unzip();
        self.derive(|d| {
            d.columns = columns;
            d.values = vec![row];
        })
    }

    /// Use a SELECT as the row source: `INSERT INTO t (cols) SELECT ...`.
    pub fn select(&self, select: SelectBuilder) -> Self {
        self.set(|d| &mut d.select, Some(select))
    }
}

impl SqlQb for InsertBuilder {
    fn render(&self) -> SqlResult<BuiltQuery> {
        let d = &*self.data;
        if d.table.is_empty() {
            return Err(SqlError::validation("insert statements must specify a table"));
        }
        if d.values.is_empty() && d.select.is_none() {
            return Err(SqlError::validation(
                "insert statements must have at least one set of values or select clause",
            ));
        }
        if !d.values.is_empty() && d.select.is_some() {
            return Err(SqlError::validation(
                "insert statements must not have both values and a select clause",
            ));
        }

        let mut sql = String::new();
        let mut params = Vec::new();

        append_to_sql(&d.prefixes, &mut sql, " ", &mut params)?;
        if !sql.is_empty() {
            sql.push(' ');
        }

        sql.push_str(d.verb.keyword());
        sql.push(' ');

        if !d.options.is_empty() {
            sql.push_str(&d.options.join(" "));
            sql.push(' ');
        }

        sql.push_str("INTO ");
        sql.push_str(&d.table);
        sql.push(' ');

        if !d.columns.is_empty() {
            sql.push('(');
            sql.push_str(&d.columns.join(", "));
            sql.push_str(") ");
        }

        if let Some(select) = &d.select {
            let built = select.render()?;
            sql.push_str(&built.sql);
            params.extend(built.params);
        } else {
            sql.push_str("VALUES ");
            for (i, row) in d.values.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push('(');
                for (j, cell) in row.iter().enumerate() {
                    if j > 0 {
                        sql.push_str(", ");
                    }
                    cell.append_to(&mut sql, &mut params)?;
                }
                sql.push(')');
            }
        }

        append_clause(&d.suffixes, &mut sql, " ", " ", &mut params)?;

        Ok(BuiltQuery::new(sql, params))
    }

    fn format(&self) -> PlaceholderFormat {
        self.data.placeholder_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::param::Param;
    use crate::qb::{Expr, insert, replace, select};
    use std::collections::BTreeMap;

    fn debug_params(built: &BuiltQuery) -> Vec<String> {
        built.params.iter().map(|p| format!("{:?}", p)).collect()
    }

    #[test]
    fn test_insert_multiple_rows() {
        let built = insert("users")
            .columns(["name", "age"])
            .values([SetValue::value("alice"), SetValue::value(30i32)])
            .values([SetValue::value("bob"), SetValue::value(41i32)])
            .placeholder_format(PlaceholderFormat::Dollar)
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "INSERT INTO users (name, age) VALUES ($1, $2), ($3, $4)"
        );
        assert_eq!(
            debug_params(&built),
            vec!["Param(\"alice\")", "Param(30)", "Param(\"bob\")", "Param(41)"]
        );
    }

    #[test]
    fn test_insert_all_clauses() {
        let built = insert("a")
            .prefix_expr(Expr::new("WITH prefix AS ?").bind(0i32))
            .options(["DELAYED", "IGNORE"])
            .columns(["b", "c"])
            .values([SetValue::value(1i32), SetValue::value(2i32)])
            .values([
                SetValue::value(3i32),
                SetValue::from(Expr::new("? + 1").bind(4i32)),
            ])
            .suffix("RETURNING id")
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "WITH prefix AS ? INSERT DELAYED IGNORE INTO a (b, c) VALUES (?, ?), (?, ? + 1) RETURNING id"
        );
        assert_eq!(built.params.len(), 5);
    }

    #[test]
    fn test_replace_verb() {
        let built = replace("kv")
            .columns(["k", "v"])
            .values([SetValue::value("a"), SetValue::value("b")])
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, "REPLACE INTO kv (k, v) VALUES (?, ?)");
    }

    #[test]
    fn test_insert_validation() {
        let err = InsertBuilder::default()
            .values([SetValue::value(1i32)])
            .to_sql()
            .unwrap_err();
        assert!(err.to_string().contains("must specify a table"));

        let err = insert("users").columns(["a"]).to_sql().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("at least one set of values or select clause"));

        let err = insert("users")
            .values([SetValue::value(1i32)])
            .select(select(["1"]))
            .to_sql()
            .unwrap_err();
        assert!(err.to_string().contains("not have both"));
    }

    #[test]
    fn test_insert_select() {
        let source = select(["name", "age"])
            .from("staging")
            .gt("age", 18i32)
            .placeholder_format(PlaceholderFormat::Dollar);
        let built = insert("users")
            .prefix_expr(Expr::new("/* batch ? */").bind(9i32))
            .columns(["name", "age"])
            .select(source)
            .placeholder_format(PlaceholderFormat::Dollar)
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "/* batch $1 */ INSERT INTO users (name, age) SELECT name, age FROM staging WHERE age > $2"
        );
        assert_eq!(debug_params(&built), vec!["Param(9)", "Param(18)"]);
    }

    #[test]
    fn test_set_map_sorts_columns() {
        let row = BTreeMap::from([("b", Param::new(2i32)), ("a", Param::new(1i32))]);
        let built = insert("t")
            .columns(["ignored"])
            .set_map(row)
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, "INSERT INTO t (a, b) VALUES (?, ?)");
        assert_eq!(debug_params(&built), vec!["Param(1)", "Param(2)"]);
    }

    #[test]
    fn test_subselect_cell_is_parenthesized() {
        let built = insert("audit")
            .columns(["user_id", "at"])
            .values([
                SetValue::from(select(["id"]).from("users").eq("name", "bob")),
                SetValue::from(Expr::new("NOW()")),
            ])
            .placeholder_format(PlaceholderFormat::Colon)
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            "INSERT INTO audit (user_id, at) VALUES ((SELECT id FROM users WHERE name = :1), NOW())"
        );
    }
}
