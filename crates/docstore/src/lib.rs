//! The docstore crate.
//!
//! This crate stores schemaless JSON documents in SQLite.  Each table has one column, `data`, holding the document in
//! SQLite's JSONB encoding, plus a unique index on the document's `id`.  Queries are written in SQL with a shorthand for
//! document fields:
//!
//! - `$name` means `data->>'$.name'`, and `$a.b` means `data->>'$.a.b'`.
//! - Values never go into the SQL text.  They are carried alongside it and bound to positional parameters.
//!
//! The pieces, from the bottom up:
//!
//! - [path] translates the shorthand.
//! - A [Fragment] is translated SQL text with holes, built with a [FragmentBuilder].
//! - A [Statement] joins raw text (verbs, table names) and fragments into the final SQL and its argument list.
//! - A [Table] runs statements against a borrowed [rusqlite::Connection].
//!
//! Translation and DDL generation are pure, so their results are cached process-wide by [memo].
//!
//! ```
//! use ammo_docstore::{Fragment, Table};
//! use serde_json::json;
//!
//! let conn = rusqlite::Connection::open_in_memory()?;
//! let jedi = Table::<serde_json::Value>::new(&conn, "jedi")?;
//! jedi.insert(json!({"name": "yoda", "age": 900}))?;
//!
//! let old = Fragment::builder().text("where $age > ").value(100).build();
//! assert_eq!(jedi.all(&[&old])?.len(), 1);
//! # Ok::<(), ammo_docstore::Error>(())
//! ```
pub mod connection;
pub mod ddl;
mod document;
mod errors;
mod fragment;
pub mod ids;
mod lexer;
pub mod memo;
mod param;
pub mod path;
mod statement;
mod table;

pub use connection::{ConnectionConfig, ConnectionConfigBuilder};
pub use document::*;
pub use errors::*;
pub use fragment::*;
pub use ids::{IdGenerator, UuidV7Generator};
pub use param::*;
pub use statement::*;
pub use table::*;
