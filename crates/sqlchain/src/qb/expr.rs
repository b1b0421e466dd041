//! Renderable fragments and their composition.
//!
//! Every clause piece a builder stores is a [`Fragment`]: a raw [`Expr`] with
//! its own bound values, a nested [`Statement`], an aliased sub-statement, a
//! CTE entry, or an AND/OR group of other fragments. Rendering a fragment
//! yields SQL text containing neutral `?` markers plus the bound values in the
//! order their markers appear; dialect rewriting happens once, on the outermost
//! statement.

use crate::error::SqlResult;
use crate::placeholder::PlaceholderFormat;
use crate::qb::delete::DeleteBuilder;
use crate::qb::insert::InsertBuilder;
use crate::qb::param::Param;
use crate::qb::select::SelectBuilder;
use crate::qb::traits::{BuiltQuery, SqlQb};
use crate::qb::update::UpdateBuilder;
use tokio_postgres::types::ToSql;

/// Raw SQL text with `?` markers and the values bound to them.
///
/// ```ignore
/// let e = Expr::new("created_at > ? AND created_at < ?").bind(from).bind(to);
/// let e = Expr::eq("status", "active");
/// ```
#[derive(Clone, Debug)]
pub struct Expr {
    sql: String,
    params: Vec<Param>,
}

impl Expr {
    /// Create an expression from raw SQL text.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind the value for the next `?` marker.
    pub fn bind<T: ToSql + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.params.push(Param::new(value));
        self
    }

    /// Bind an already wrapped value.
    pub fn bind_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// SQL text of this expression.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values bound to this expression.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    fn compare<T: ToSql + Send + Sync + 'static>(column: &str, op: &str, value: T) -> Self {
        Self::new(format!("{} {} ?", column, op)).bind(value)
    }

    /// column = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "=", value)
    }

    /// column <> value
    pub fn ne<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "<>", value)
    }

    /// column > value
    pub fn gt<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, ">", value)
    }

    /// column >= value
    pub fn gte<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, ">=", value)
    }

    /// column < value
    pub fn lt<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "<", value)
    }

    /// column <= value
    pub fn lte<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "<=", value)
    }

    /// column LIKE pattern
    pub fn like<T: ToSql + Send + Sync + 'static>(column: &str, pattern: T) -> Self {
        Self::compare(column, "LIKE", pattern)
    }

    /// column IN (values...)
    ///
    /// An empty list renders `(1=0)` so the predicate is still valid SQL.
    pub fn in_list<T: ToSql + Send + Sync + 'static>(
        column: &str,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let params: Vec<Param> = values.into_iter().map(Param::new).collect();
        if params.is_empty() {
            return Self::new("(1=0)");
        }
        let markers = vec!["?"; params.len()].join(", ");
        Self {
            sql: format!("{} IN ({})", column, markers),
            params,
        }
    }

    /// column IS NULL
    pub fn is_null(column: &str) -> Self {
        Self::new(format!("{} IS NULL", column))
    }

    /// column IS NOT NULL
    pub fn is_not_null(column: &str) -> Self {
        Self::new(format!("{} IS NOT NULL", column))
    }
}

/// Boolean connective of a fragment group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conj {
    And,
    Or,
}

impl Conj {
    fn separator(self) -> &'static str {
        match self {
            Conj::And => " AND ",
            Conj::Or => " OR ",
        }
    }

    /// SQL used when the group has nothing to render.
    fn identity(self) -> &'static str {
        match self {
            Conj::And => "(1=1)",
            Conj::Or => "(1=0)",
        }
    }
}

/// A complete statement usable as a fragment (subquery, CTE body, terminal).
#[derive(Clone, Debug)]
pub enum Statement {
    Select(SelectBuilder),
    Insert(InsertBuilder),
    Update(UpdateBuilder),
    Delete(DeleteBuilder),
}

impl Statement {
    /// Return a copy whose placeholder format is replaced by `format`.
    pub fn with_placeholder_format(&self, format: PlaceholderFormat) -> Self {
        match self {
            Statement::Select(b) => Statement::Select(b.placeholder_format(format)),
            Statement::Insert(b) => Statement::Insert(b.placeholder_format(format)),
            Statement::Update(b) => Statement::Update(b.placeholder_format(format)),
            Statement::Delete(b) => Statement::Delete(b.placeholder_format(format)),
        }
    }

    /// Whether this is a SELECT (parenthesized when used as a value).
    pub fn is_select(&self) -> bool {
        matches!(self, Statement::Select(_))
    }

    fn as_qb(&self) -> &dyn SqlQb {
        match self {
            Statement::Select(b) => b,
            Statement::Insert(b) => b,
            Statement::Update(b) => b,
            Statement::Delete(b) => b,
        }
    }
}

impl SqlQb for Statement {
    fn render(&self) -> SqlResult<BuiltQuery> {
        self.as_qb().render()
    }

    fn format(&self) -> PlaceholderFormat {
        self.as_qb().format()
    }
}

impl From<SelectBuilder> for Statement {
    fn from(b: SelectBuilder) -> Self {
        Statement::Select(b)
    }
}

impl From<InsertBuilder> for Statement {
    fn from(b: InsertBuilder) -> Self {
        Statement::Insert(b)
    }
}

impl From<UpdateBuilder> for Statement {
    fn from(b: UpdateBuilder) -> Self {
        Statement::Update(b)
    }
}

impl From<DeleteBuilder> for Statement {
    fn from(b: DeleteBuilder) -> Self {
        Statement::Delete(b)
    }
}

/// A composable unit of SQL text plus its ordered bound values.
#[derive(Clone, Debug)]
pub enum Fragment {
    /// Raw text with literal bound values.
    Expr(Expr),
    /// A nested statement rendered as-is.
    Statement(Statement),
    /// `(<statement>) AS <alias>`
    Aliased { statement: Statement, alias: String },
    /// `<name> AS (<statement>)`
    Cte { name: String, statement: Statement },
    /// `(a AND b ...)` / `(a OR b ...)`
    Group { conj: Conj, parts: Vec<Fragment> },
}

impl Fragment {
    /// Wrap a statement as `(<statement>) AS <alias>`.
    pub fn aliased(statement: impl Into<Statement>, alias: impl Into<String>) -> Self {
        Fragment::Aliased {
            statement: statement.into(),
            alias: alias.into(),
        }
    }

    /// Group fragments with AND.
    pub fn and<F: Into<Fragment>>(parts: impl IntoIterator<Item = F>) -> Self {
        Fragment::Group {
            conj: Conj::And,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Group fragments with OR.
    pub fn or<F: Into<Fragment>>(parts: impl IntoIterator<Item = F>) -> Self {
        Fragment::Group {
            conj: Conj::Or,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Render this fragment on its own (neutral `?` markers).
    pub fn render(&self) -> SqlResult<BuiltQuery> {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.append_to(&mut sql, &mut params)?;
        Ok(BuiltQuery::new(sql, params))
    }

    /// Append this fragment's text to `sql` and its values to `params`.
    pub(crate) fn append_to(&self, sql: &mut String, params: &mut Vec<Param>) -> SqlResult<()> {
        match self {
            Fragment::Expr(expr) => {
                sql.push_str(&expr.sql);
                params.extend(expr.params.iter().cloned());
            }
            Fragment::Statement(stmt) => {
                let built = stmt.render()?;
                sql.push_str(&built.sql);
                params.extend(built.params);
            }
            Fragment::Aliased { statement, alias } => {
                let built = statement.render()?;
                sql.push('(');
                sql.push_str(&built.sql);
                sql.push_str(") AS ");
                sql.push_str(alias);
                params.extend(built.params);
            }
            Fragment::Cte { name, statement } => {
                let built = statement.render()?;
                sql.push_str(name);
                sql.push_str(" AS (");
                sql.push_str(&built.sql);
                sql.push(')');
                params.extend(built.params);
            }
            Fragment::Group { conj, parts } => {
                let mut inner = String::new();
                append_to_sql(parts, &mut inner, conj.separator(), params)?;
                if inner.is_empty() {
                    sql.push_str(conj.identity());
                } else {
                    sql.push('(');
                    sql.push_str(&inner);
                    sql.push(')');
                }
            }
        }
        Ok(())
    }

    /// Append this fragment in value position (SET right-hand side, VALUES
    /// cell): a SELECT is parenthesized, everything else renders as-is.
    pub(crate) fn append_as_value(
        &self,
        sql: &mut String,
        params: &mut Vec<Param>,
    ) -> SqlResult<()> {
        match self {
            Fragment::Statement(stmt) if stmt.is_select() => {
                let built = stmt.render()?;
                sql.push('(');
                sql.push_str(&built.sql);
                sql.push(')');
                params.extend(built.params);
                Ok(())
            }
            _ => self.append_to(sql, params),
        }
    }
}

impl From<Expr> for Fragment {
    fn from(e: Expr) -> Self {
        Fragment::Expr(e)
    }
}

impl From<&str> for Fragment {
    fn from(sql: &str) -> Self {
        Fragment::Expr(Expr::new(sql))
    }
}

impl From<String> for Fragment {
    fn from(sql: String) -> Self {
        Fragment::Expr(Expr::new(sql))
    }
}

impl From<Statement> for Fragment {
    fn from(s: Statement) -> Self {
        Fragment::Statement(s)
    }
}

impl From<SelectBuilder> for Fragment {
    fn from(b: SelectBuilder) -> Self {
        Fragment::Statement(b.into())
    }
}

impl From<InsertBuilder> for Fragment {
    fn from(b: InsertBuilder) -> Self {
        Fragment::Statement(b.into())
    }
}

impl From<UpdateBuilder> for Fragment {
    fn from(b: UpdateBuilder) -> Self {
        Fragment::Statement(b.into())
    }
}

impl From<DeleteBuilder> for Fragment {
    fn from(b: DeleteBuilder) -> Self {
        Fragment::Statement(b.into())
    }
}

/// Render `parts` in order, joined by `sep`, appending text to `sql` and
/// values to `params`.
///
/// Fragments that render to empty text are skipped along with their
/// arguments (no dangling separator).
/// The first failing fragment aborts the whole composition and its error is
/// returned unchanged.
pub(crate) fn append_to_sql(
    parts: &[Fragment],
    sql: &mut String,
    sep: &str,
    params: &mut Vec<Param>,
) -> SqlResult<()> {
    let mut wrote_any = false;
    for part in parts {
        let mut part_sql = String::new();
        let mut part_params = Vec::new();
        part.append_to(&mut part_sql, &mut part_params)?;
        if part_sql.is_empty() {
            continue;
        }
        if wrote_any {
            sql.push_str(sep);
        }
        sql.push_str(&part_sql);
        params.extend(part_params);
        wrote_any = true;
    }
    Ok(())
}

/// Like [`append_to_sql`], but opens the clause with `lead` (for example
/// `" WHERE "`). Writes nothing when every part renders empty.
pub(crate) fn append_clause(
    parts: &[Fragment],
    sql: &mut String,
    lead: &str,
    sep: &str,
    params: &mut Vec<Param>,
) -> SqlResult<()> {
    let mut clause = String::new();
    append_to_sql(parts, &mut clause, sep, params)?;
    if !clause.is_empty() {
        sql.push_str(lead);
        sql.push_str(&clause);
    }
    Ok(())
}
