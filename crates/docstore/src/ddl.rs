//! SQL for creating document tables and their indexes.
//!
//! Everything here is idempotent (`if not exists`) and memoized, since tables are bound over and over against the same
//! names.
use std::sync::Arc;

use regex::Regex;

use crate::memo;
use crate::path::DATA_COLUMN;

lazy_static::lazy_static! {
    static ref NON_LETTERS: Regex = Regex::new(r"[^a-zA-Z]+").expect("Regex should compile");
}

/// Options for [create_index].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreateIndex<'a> {
    pub table: &'a str,

    /// The indexed expression, in SQLite syntax (translate shorthand first).
    pub expr: &'a str,

    /// Defaults to `table_` followed by the expression with every run of non-letters replaced by `_`.
    pub name: Option<&'a str>,

    pub unique: bool,
}

pub fn create_table(name: &str) -> Arc<str> {
    memo::global().get_or_insert_with("ddl::create_table", name, || {
        format!("create table if not exists {} ({} blob)", name, DATA_COLUMN)
    })
}

/// Turn an expression into something usable in an identifier, e.g. `data->>'$.id'` into `data_id`.
///
/// Runs of anything but ASCII letters become a single `_`, and a trailing `_` is dropped.  The result depends only on
/// the expression, so binding the same table twice never tries to create a second index under a different name.
pub fn expr_to_name(expr: &str) -> Arc<str> {
    memo::global().get_or_insert_with("ddl::expr_to_name", expr, || {
        let replaced = NON_LETTERS.replace_all(expr, "_");
        replaced
            .strip_suffix('_')
            .unwrap_or(&replaced)
            .to_string()
    })
}

pub fn create_index(options: &CreateIndex) -> Arc<str> {
    memo::global().get_or_insert_with("ddl::create_index", &format!("{:?}", options), || {
        let name = match options.name {
            Some(n) => n.to_string(),
            None => format!("{}_{}", options.table, expr_to_name(options.expr)),
        };

        format!(
            "create {}index if not exists {} on {} ({})",
            if options.unique { "unique " } else { "" },
            name,
            options.table,
            options.expr
        )
    })
}

pub fn insert_statement(table: &str) -> Arc<str> {
    memo::global().get_or_insert_with("ddl::insert_statement", table, || {
        format!("insert into {} ({}) values (jsonb(?))", table, DATA_COLUMN)
    })
}
