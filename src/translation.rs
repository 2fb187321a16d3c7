use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::{PostgresLiteError, Result};
use crate::types::Value;

lazy_static! {
    static ref DOLLAR_PLACEHOLDER: Regex =
        Regex::new(r"\$(\d+)").expect("dollar placeholder pattern is valid");
}

/// SQLite's positional placeholder, consumed once per occurrence.
pub const NATIVE_PLACEHOLDER: &str = "?";

/// Placeholder dialect found in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderDialect {
    /// SQLite-style `?`, bound positionally in argument order.
    Native,
    /// asyncpg-style `$1`, `$2`, bound by index; repeats and any order allowed.
    PositionalDollar,
}

/// Detect which placeholder dialect `query` uses.
#[must_use]
pub fn detect_dialect(query: &str) -> PlaceholderDialect {
    if DOLLAR_PLACEHOLDER.is_match(query) {
        PlaceholderDialect::PositionalDollar
    } else {
        PlaceholderDialect::Native
    }
}

/// A query rewritten into native placeholders together with the arguments it binds.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedStatement<'a> {
    pub query: Cow<'a, str>,
    pub args: Vec<Value>,
}

impl<'a> TranslatedStatement<'a> {
    /// Use the query and arguments exactly as given.
    #[must_use]
    pub fn passthrough(query: &'a str, args: &[Value]) -> Self {
        Self {
            query: Cow::Borrowed(query),
            args: args.to_vec(),
        }
    }
}

/// Translate `$N` placeholders into native `?` placeholders.
///
/// Every `$N` occurrence becomes `?` and contributes `args[N - 1]` to the rebuilt argument list,
/// so a placeholder may be reused or referenced out of order:
/// ```rust
/// use postgreslite::{args, translate};
///
/// let stmt = translate("insert into t(a, b, c) values ($2, $1, $2)", &args!["x", "y"])?;
/// assert_eq!(stmt.query, "insert into t(a, b, c) values (?, ?, ?)");
/// assert_eq!(stmt.args, args!["y", "x", "y"]);
/// # Ok::<(), postgreslite::PostgresLiteError>(())
/// ```
/// Queries without `$N` markers are returned borrowed with the arguments untouched. When no
/// arguments are supplied the argument list is always empty.
///
/// # Errors
/// Returns [`PostgresLiteError::ParameterError`] when a placeholder refers to `$0` or to an
/// argument beyond the supplied list.
pub fn translate<'a>(query: &'a str, args: &[Value]) -> Result<TranslatedStatement<'a>> {
    if detect_dialect(query) == PlaceholderDialect::Native {
        return Ok(TranslatedStatement::passthrough(query, args));
    }

    let mut native_args = Vec::with_capacity(args.len());
    let mut out = String::with_capacity(query.len());
    let mut last = 0;

    for caps in DOLLAR_PLACEHOLDER.captures_iter(query) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&query[last..whole.start()]);
        out.push_str(NATIVE_PLACEHOLDER);
        last = whole.end();

        if !args.is_empty() {
            native_args.push(resolve_argument(&caps, args)?);
        }
    }
    out.push_str(&query[last..]);

    tracing::trace!(native = %out, bound = native_args.len(), "translated placeholders");

    Ok(TranslatedStatement {
        query: Cow::Owned(out),
        args: native_args,
    })
}

fn resolve_argument(caps: &Captures<'_>, args: &[Value]) -> Result<Value> {
    let digits = caps.get(1).map_or("", |m| m.as_str());
    let index = digits
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=args.len()).contains(n))
        .ok_or_else(|| {
            PostgresLiteError::ParameterError(format!(
                "placeholder ${digits} has no matching argument ({} supplied)",
                args.len()
            ))
        })?;
    Ok(args[index - 1].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn repeated_placeholders_duplicate_arguments() {
        let stmt = translate("select $1, $1, $2", &args!["A", "B"]).unwrap();
        assert_eq!(stmt.query, "select ?, ?, ?");
        assert_eq!(stmt.args, args!["A", "A", "B"]);
    }

    #[test]
    fn translation_is_deterministic() {
        let params = args![1, 2, 3];
        let sql = "update t set a = $3 where b = $1 or c = $3";
        let first = translate(sql, &params).unwrap();
        let second = translate(sql, &params).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.args, args![3, 1, 3]);
    }

    #[test]
    fn native_queries_pass_through_borrowed() {
        let sql = "insert into users (name) values (?)";
        let stmt = translate(sql, &args!["AlexFlipnote"]).unwrap();
        assert!(matches!(stmt.query, Cow::Borrowed(_)));
        assert_eq!(stmt.query, sql);
        assert_eq!(stmt.args, args!["AlexFlipnote"]);
    }

    #[test]
    fn zero_arguments_yield_empty_list() {
        let stmt = translate("select $1", &[]).unwrap();
        assert_eq!(stmt.query, "select ?");
        assert!(stmt.args.is_empty());
        assert!(translate("select 1", &[]).unwrap().args.is_empty());
    }

    #[test]
    fn out_of_range_placeholder_is_an_error() {
        let err = translate("select $3", &args![1, 2]).unwrap_err();
        assert!(matches!(err, PostgresLiteError::ParameterError(msg) if msg.contains("$3")));
        assert!(translate("select $0", &args![1]).is_err());
    }

    #[test]
    fn multi_digit_placeholders() {
        let params: Vec<Value> = (1..=11).map(Value::from).collect();
        let stmt = translate("select $11, $1", &params).unwrap();
        assert_eq!(stmt.query, "select ?, ?");
        assert_eq!(stmt.args, args![11, 1]);
    }

    #[test]
    fn dialect_detection() {
        assert_eq!(detect_dialect("select $1"), PlaceholderDialect::PositionalDollar);
        assert_eq!(detect_dialect("select ?"), PlaceholderDialect::Native);
        assert_eq!(detect_dialect("select '$'"), PlaceholderDialect::Native);
    }
}
