//! Placeholder dialects.
//!
//! Builders always render the neutral `?` marker, one per bound argument, in
//! the same left-to-right order as the argument list. A [`PlaceholderFormat`]
//! rewrites those markers into the syntax a driver expects:
//!
//! | Format | Output |
//! |---|---|
//! | [`PlaceholderFormat::Question`] | `?` (text left untouched) |
//! | [`PlaceholderFormat::Dollar`] | `$1, $2, ...` |
//! | [`PlaceholderFormat::Colon`] | `:1, :2, ...` |
//! | [`PlaceholderFormat::AtP`] | `@p1, @p2, ...` |
//!
//! A literal `?` (e.g. the Postgres JSONB `?` operator) is written as `??`.
//! Numbered formats collapse `??` to a single `?` without consuming a number.
//! `Question` returns the text verbatim, so `??` survives until a numbered
//! pass runs; this is what lets nested statements be rendered with `Question`
//! and renumbered exactly once by the outermost statement.

use crate::error::{SqlError, SqlResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;

/// Placeholder dialect selected per builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderFormat {
    /// `?` markers, passed through unchanged (MySQL, SQLite).
    #[default]
    Question,
    /// `$1`, `$2`, ... (Postgres).
    Dollar,
    /// `:1`, `:2`, ... (Oracle).
    Colon,
    /// `@p1`, `@p2`, ... (SQL Server).
    #[serde(rename = "atp")]
    AtP,
}

impl PlaceholderFormat {
    /// Rewrite neutral `?` markers into this dialect.
    pub fn replace_placeholders(self, sql: &str) -> SqlResult<String> {
        match self {
            Self::Question => Ok(sql.to_string()),
            Self::Dollar => Ok(replace_positional(sql, "$")),
            Self::Colon => Ok(replace_positional(sql, ":")),
            Self::AtP => Ok(replace_positional(sql, "@p")),
        }
    }

    /// The dialect's name as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Dollar => "dollar",
            Self::Colon => "colon",
            Self::AtP => "atp",
        }
    }
}

impl FromStr for PlaceholderFormat {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "question" | "?" => Ok(Self::Question),
            "dollar" | "$" => Ok(Self::Dollar),
            "colon" | ":" => Ok(Self::Colon),
            "atp" | "@p" => Ok(Self::AtP),
            other => Err(SqlError::Placeholder(format!(
                "unknown placeholder format '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PlaceholderFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn replace_positional(sql: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut idx: usize = 0;
    let mut rest = sql;

    while let Some(pos) = rest.find('?') {
        out.push_str(&rest[..pos]);
        if rest[pos + 1..].starts_with('?') {
            out.push('?');
            rest = &rest[pos + 2..];
        } else {
            idx += 1;
            let _ = write!(&mut out, "{}{}", prefix, idx);
            rest = &rest[pos + 1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_is_pass_through() {
        let sql = "x = ? AND y = ??";
        assert_eq!(PlaceholderFormat::Question.replace_placeholders(sql).unwrap(), sql);
    }

    #[test]
    fn dollar_numbers_markers() {
        let sql = PlaceholderFormat::Dollar
            .replace_placeholders("a = ? AND b = ? AND c IN (?, ?)")
            .unwrap();
        assert_eq!(sql, "a = $1 AND b = $2 AND c IN ($3, $4)");
    }

    #[test]
    fn doubled_marker_collapses_without_counting() {
        let sql = PlaceholderFormat::Dollar
            .replace_placeholders("x = ? AND y = ??")
            .unwrap();
        assert_eq!(sql, "x = $1 AND y = ?");

        let sql = PlaceholderFormat::Dollar
            .replace_placeholders("data ?? 'k' AND id = ?")
            .unwrap();
        assert_eq!(sql, "data ? 'k' AND id = $1");
    }

    #[test]
    fn colon_and_atp() {
        assert_eq!(
            PlaceholderFormat::Colon.replace_placeholders("? ?").unwrap(),
            ":1 :2"
        );
        assert_eq!(
            PlaceholderFormat::AtP.replace_placeholders("? ?? ?").unwrap(),
            "@p1 ? @p2"
        );
    }

    #[test]
    fn unbalanced_text_is_best_effort() {
        assert_eq!(
            PlaceholderFormat::Dollar.replace_placeholders("???").unwrap(),
            "?$1"
        );
        assert_eq!(PlaceholderFormat::Dollar.replace_placeholders("?").unwrap(), "$1");
        assert_eq!(PlaceholderFormat::Dollar.replace_placeholders("").unwrap(), "");
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let sql = PlaceholderFormat::Dollar
            .replace_placeholders("name = ? -- ünïcödé ?")
            .unwrap();
        assert_eq!(sql, "name = $1 -- ünïcödé $2");
    }

    #[test]
    fn parse_names() {
        assert_eq!("dollar".parse::<PlaceholderFormat>().unwrap(), PlaceholderFormat::Dollar);
        assert_eq!("$".parse::<PlaceholderFormat>().unwrap(), PlaceholderFormat::Dollar);
        assert_eq!(" AtP ".parse::<PlaceholderFormat>().unwrap(), PlaceholderFormat::AtP);
        assert_eq!("?".parse::<PlaceholderFormat>().unwrap(), PlaceholderFormat::Question);
        let err = "percent".parse::<PlaceholderFormat>().unwrap_err();
        assert!(matches!(err, SqlError::Placeholder(_)));
    }

    #[test]
    fn serde_names() {
        let f: PlaceholderFormat = serde_json::from_str("\"atp\"").unwrap();
        assert_eq!(f, PlaceholderFormat::AtP);
        assert_eq!(
            serde_json::to_string(&PlaceholderFormat::Colon).unwrap(),
            "\"colon\""
        );
    }
}
