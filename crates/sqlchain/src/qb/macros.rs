/// Wire a builder handle to its data record: [`Snapshot`], [`SqlQb::format`]
/// plumbing and [`RunQb`].
///
/// The data record must have `placeholder_format` and `runner` fields.
///
/// [`Snapshot`]: crate::qb::snapshot::Snapshot
/// [`SqlQb::format`]: crate::qb::SqlQb::format
/// [`RunQb`]: crate::qb::RunQb
macro_rules! impl_snapshot {
    ($builder:ident, $data:ident) => {
        impl $crate::qb::snapshot::Snapshot for $builder {
            type Data = $data;

            fn data(&self) -> &::std::sync::Arc<$data> {
                &self.data
            }

            fn from_data(data: ::std::sync::Arc<$data>) -> Self {
                Self { data }
            }
        }

        impl $crate::qb::traits::RunQb for $builder {
            fn runner(&self) -> Option<&$crate::client::RunnerHandle> {
                self.data.runner.as_ref()
            }
        }

        impl Default for $builder {
            fn default() -> Self {
                Self {
                    data: ::std::sync::Arc::new($data::default()),
                }
            }
        }
    };
}

/// `placeholder_format` and `run_with` setters.
macro_rules! impl_runner_methods {
    () => {
        /// Set the placeholder format (e.g. `Question` or `Dollar`) for the statement.
        pub fn placeholder_format(&self, format: $crate::placeholder::PlaceholderFormat) -> Self {
            $crate::qb::snapshot::Snapshot::set(self, |d| &mut d.placeholder_format, format)
        }

        /// Attach a runner used by `exec`, `query`, `query_row` and `scan`.
        pub fn run_with(&self, runner: impl Into<$crate::client::RunnerHandle>) -> Self {
            $crate::qb::snapshot::Snapshot::set(self, |d| &mut d.runner, Some(runner.into()))
        }
    };
}

/// `prefix` / `suffix` methods. The data record must have `prefixes` and
/// `suffixes` fields.
macro_rules! impl_affix_methods {
    () => {
        /// Add an expression to the beginning of the statement.
        pub fn prefix(&self, sql: &str) -> Self {
            self.prefix_expr($crate::qb::Expr::new(sql))
        }

        /// Add a fragment to the beginning of the statement.
        pub fn prefix_expr(&self, expr: impl Into<$crate::qb::Fragment>) -> Self {
            $crate::qb::snapshot::Snapshot::append(self, |d| &mut d.prefixes, expr.into())
        }

        /// Add an expression to the end of the statement.
        pub fn suffix(&self, sql: &str) -> Self {
            self.suffix_expr($crate::qb::Expr::new(sql))
        }

        /// Add a fragment to the end of the statement.
        pub fn suffix_expr(&self, expr: impl Into<$crate::qb::Fragment>) -> Self {
            $crate::qb::snapshot::Snapshot::append(self, |d| &mut d.suffixes, expr.into())
        }
    };
}

/// WHERE predicate methods. The data record must have a `where_parts` field.
/// Predicates are joined with AND in insertion order.
macro_rules! impl_where_methods {
    () => {
        /// Add a raw WHERE predicate without bound values.
        pub fn where_(&self, sql: &str) -> Self {
            self.where_expr($crate::qb::Expr::new(sql))
        }

        /// Add a WHERE predicate: an [`Expr`](crate::qb::Expr), a group, or a
        /// nested statement.
        pub fn where_expr(&self, pred: impl Into<$crate::qb::Fragment>) -> Self {
            $crate::qb::snapshot::Snapshot::append(self, |d| &mut d.where_parts, pred.into())
        }

        /// Add WHERE: column = value
        pub fn eq<T: ::tokio_postgres::types::ToSql + Send + Sync + 'static>(
            &self,
            column: &str,
            value: T,
        ) -> Self {
            self.where_expr($crate::qb::Expr::eq(column, value))
        }

        /// Add WHERE: column <> value
        pub fn ne<T: ::tokio_postgres::types::ToSql + Send + Sync + 'static>(
            &self,
            column: &str,
            value: T,
        ) -> Self {
            self.where_expr($crate::qb::Expr::ne(column, value))
        }

        /// Add WHERE: column > value
        pub fn gt<T: ::tokio_postgres::types::ToSql + Send + Sync + 'static>(
            &self,
            column: &str,
            value: T,
        ) -> Self {
            self.where_expr($crate::qb::Expr::gt(column, value))
        }

        /// Add WHERE: column >= value
        pub fn gte<T: ::tokio_postgres::types::ToSql + Send + Sync + 'static>(
            &self,
            column: &str,
            value: T,
        ) -> Self {
            self.where_expr($crate::qb::Expr::gte(column, value))
        }

        /// Add WHERE: column < value
        pub fn lt<T: ::tokio_postgres::types::ToSql + Send + Sync + 'static>(
            &self,
            column: &str,
            value: T,
        ) -> Self {
            self.where_expr($crate::qb::Expr::lt(column, value))
        }

        /// Add WHERE: column <= value
        pub fn lte<T: ::tokio_postgres::types::ToSql + Send + Sync + 'static>(
            &self,
            column: &str,
            value: T,
        ) -> Self {
            self.where_expr($crate::qb::Expr::lte(column, value))
        }

        /// Add WHERE: column LIKE pattern
        pub fn like<T: ::tokio_postgres::types::ToSql + Send + Sync + 'static>(
            &self,
            column: &str,
            pattern: T,
        ) -> Self {
            self.where_expr($crate::qb::Expr::like(column, pattern))
        }

        /// Add WHERE: column IN (values...)
        pub fn in_list<T: ::tokio_postgres::types::ToSql + Send + Sync + 'static>(
            &self,
            column: &str,
            values: impl IntoIterator<Item = T>,
        ) -> Self {
            self.where_expr($crate::qb::Expr::in_list(column, values))
        }

        /// Add WHERE: column IS NULL
        pub fn is_null(&self, column: &str) -> Self {
            self.where_expr($crate::qb::Expr::is_null(column))
        }

        /// Add WHERE: column IS NOT NULL
        pub fn is_not_null(&self, column: &str) -> Self {
            self.where_expr($crate::qb::Expr::is_not_null(column))
        }
    };
}
