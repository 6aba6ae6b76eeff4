//! Assembling fragments into one statement.
//!
//! A statement is a run of pieces joined with single spaces.  Raw pieces go in verbatim and carry no parameters; a
//! fragment contributes its segments joined by `?` and its values, in order.  Argument order therefore always matches
//! placeholder order, which is what lets callers build a statement out of independently constructed conditions.
//!
//! Assembly checks that the finished text has exactly as many parameter markers as there are arguments, so a stray `?`
//! in a raw piece fails here rather than as a binding error from SQLite.
use itertools::Itertools;

use crate::fragment::Fragment;
use crate::lexer;
use crate::param::Param;

/// The marker SQLite binds positional parameters to.
pub const PLACEHOLDER: &str = "?";

#[derive(Clone, Copy, Debug)]
pub enum Piece<'a> {
    /// Emitted as-is.  Used for verbs and table names, which aren't shorthand and never have parameters.
    Raw(&'a str),
    Fragment(&'a Fragment),
}

impl<'a> From<&'a str> for Piece<'a> {
    fn from(s: &'a str) -> Self {
        Piece::Raw(s)
    }
}

impl<'a> From<&'a Fragment> for Piece<'a> {
    fn from(f: &'a Fragment) -> Self {
        Piece::Fragment(f)
    }
}

/// Final SQL text and the arguments for its placeholders.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    text: String,
    args: Vec<Param>,
}

impl Statement {
    /// # Panics
    ///
    /// If the parameter markers in the text don't match the arguments, which can only happen through a raw piece.
    pub fn assemble<'a>(pieces: impl IntoIterator<Item = Piece<'a>>) -> Statement {
        let mut args = vec![];

        let text = pieces
            .into_iter()
            .map(|p| match p {
                Piece::Raw(s) => s.to_string(),
                Piece::Fragment(f) => {
                    args.extend(f.values().iter().cloned());
                    f.segments().join(PLACEHOLDER)
                }
            })
            .join(" ");

        assert_eq!(
            lexer::parameter_count(&text),
            args.len(),
            "Parameter markers in {:?} don't match its arguments",
            text
        );
        Statement { text, args }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn args(&self) -> &[Param] {
        &self.args[..]
    }

    /// How many parameter markers the text has outside literals and comments.  Equal to `args().len()`.
    pub fn placeholder_count(&self) -> usize {
        lexer::parameter_count(&self.text)
    }

    pub fn into_parts(self) -> (String, Vec<Param>) {
        (self.text, self.args)
    }
}
