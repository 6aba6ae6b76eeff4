//! Translation of the `$field` shorthand into SQLite JSON extraction.
//!
//! `$name` becomes `data->>'$.name'`, and `$a.b.c` becomes `data->>'$.a.b.c'`.  The right side of `->>` has to be a
//! full JSON path: SQLite reads any other text as a single object key, so `data->>'a.b'` would look up the key `"a.b"`.
//! This is purely lexical: a `$` must be followed by a letter or underscore to count, so `$.foo` passes through
//! unchanged, as do numbers, operators and keywords.
//!
//! String literals, quoted identifiers and comments are left alone.  Each string is scanned on its own, so a literal
//! has to open and close within the same piece of text.
use std::sync::Arc;

use regex::Regex;

use crate::lexer::{self, Span};

/// The column documents live in.
pub const DATA_COLUMN: &str = "data";

lazy_static::lazy_static! {
    static ref PATH_REGEX: Regex =
        Regex::new(r"\$([A-Za-z_][A-Za-z_.]*)").expect("Path regex should compile");
}

/// The extraction expression for a single path, e.g. `a.b` gives `data->>'$.a.b'`.
pub fn extract(path: &str) -> String {
    format!("{}->>'$.{}'", DATA_COLUMN, path)
}

fn translate_uncached(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len() + 16);
    for span in lexer::spans(expr) {
        match span {
            Span::Code(code) => out.push_str(
                &PATH_REGEX.replace_all(code, |caps: &regex::Captures| extract(&caps[1])),
            ),
            Span::Opaque(text) => out.push_str(text),
        }
    }
    out
}

/// Translate all `$path` references in `expr`.
///
/// Results are memoized, since the same handful of expressions is translated over and over.
pub fn translate(expr: &str) -> Arc<str> {
    crate::memo::global().get_or_insert_with("path::translate", expr, || translate_uncached(expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn simple_fields() {
        assert_eq!(&*translate("$id"), "data->>'$.id'");
        assert_eq!(&*translate("$a.b.c"), "data->>'$.a.b.c'");
        assert_eq!(&*translate("$_private"), "data->>'$._private'");
    }

    #[test]
    fn translates_every_reference() {
        assert_eq!(
            &*translate("where $age > 42 and $name = ? order by $born.planet"),
            "where data->>'$.age' > 42 and data->>'$.name' = ? order by data->>'$.born.planet'"
        );
    }

    #[test]
    fn leaves_non_identifiers() {
        for s in ["$.foo", "$.", "$", "$1", "price > 5", "", "limit 1"] {
            assert_eq!(&*translate(s), s);
        }
    }

    #[test]
    fn stops_at_non_path_characters() {
        // Digits aren't part of the path pattern.
        assert_eq!(&*translate("$abc1"), "data->>'$.abc'1");
        assert_eq!(&*translate("($x)"), "(data->>'$.x')");
    }

    #[test]
    fn skips_string_literals() {
        assert_eq!(
            &*translate("where $name = '$name'"),
            "where data->>'$.name' = '$name'"
        );
        assert_eq!(
            &*translate("where $note = 'it''s $x' and $y = 1"),
            "where data->>'$.note' = 'it''s $x' and data->>'$.y' = 1"
        );
    }

    #[test]
    fn skips_comments_and_quoted_identifiers() {
        assert_eq!(
            &*translate("where $age > 1 -- don't\n and $name = "),
            "where data->>'$.age' > 1 -- don't\n and data->>'$.name' = "
        );
        assert_eq!(
            &*translate("where $a = 1 /* $b isn't used */ and $c = 2"),
            "where data->>'$.a' = 1 /* $b isn't used */ and data->>'$.c' = 2"
        );
        assert_eq!(
            &*translate("select \"o'$x\" from t where $y = 1"),
            "select \"o'$x\" from t where data->>'$.y' = 1"
        );
    }

    #[test]
    fn extract_formats() {
        assert_eq!(extract("id"), "data->>'$.id'");
    }

    proptest! {
        #[test]
        fn identifiers_translate_exactly(path in "[A-Za-z_][A-Za-z_.]{0,20}") {
            prop_assert_eq!(translate(&format!("${}", path)).to_string(), extract(&path));
        }

        #[test]
        fn without_dollars_is_identity(s in "[^$]{0,40}") {
            prop_assert_eq!(translate(&s).to_string(), s);
        }

        #[test]
        fn dollar_then_non_identifier_is_identity(rest in "[.0-9 ]{0,10}") {
            let s = format!("${}", rest);
            prop_assert_eq!(translate(&s).to_string(), s);
        }
    }
}
