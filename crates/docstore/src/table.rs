//! The document table: a SQLite table with one `data` column holding JSONB documents.
//!
//! Queries are written as [Fragment]s appended after the verb and table name, so e.g. `all(&[&where_age])` runs `select
//! json(data) from <table> where data->>'$.age' > ?`.  Fragments are appended in order and may be anything SQLite accepts
//! in that position: `where`, `order by`, `limit`, and so on.
use std::marker::PhantomData;

use log::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ddl::{self, CreateIndex};
use crate::document::{self, Document};
use crate::errors::*;
use crate::fragment::Fragment;
use crate::ids::{IdGenerator, UuidV7Generator};
use crate::path;
use crate::statement::{Piece, Statement};

lazy_static::lazy_static! {
    static ref TABLE_NAME_REGEX: regex::Regex =
        regex::Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("Regex should compile");
}

/// A table of documents, viewed as `D`.
///
/// `D` defaults to the untyped [Document].  Typed views go through [serde_json::Value], so any `D` whose serialized
/// form is a JSON object works.  To get generated ids back, give `D` an `id: Option<String>` field.
pub struct Table<'c, D = Document> {
    conn: &'c rusqlite::Connection,
    name: String,
    id_generator: Box<dyn IdGenerator>,
    _doc: PhantomData<fn() -> D>,
}

impl<'c, D: Serialize + DeserializeOwned> Table<'c, D> {
    /// Bind a table, creating it and its unique `id` index if they don't exist.
    pub fn new(conn: &'c rusqlite::Connection, name: &str) -> Result<Self> {
        Self::with_id_generator(conn, name, Box::new(UuidV7Generator))
    }

    pub fn with_id_generator(
        conn: &'c rusqlite::Connection,
        name: &str,
        id_generator: Box<dyn IdGenerator>,
    ) -> Result<Self> {
        if !TABLE_NAME_REGEX.is_match(name) {
            return Err(Error::InvalidTableName(name.to_string()));
        }

        info!("Binding document table {}", name);
        conn.execute(&ddl::create_table(name), [])?;

        let table = Table {
            conn,
            name: name.to_string(),
            id_generator,
            _doc: PhantomData,
        };
        table.create_index("$id", true)?;
        Ok(table)
    }

    pub fn connection(&self) -> &'c rusqlite::Connection {
        self.conn
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create an index over a shorthand expression, e.g. `$age`.  The name is derived from the expression.
    pub fn create_index(&self, expr: &str, unique: bool) -> Result<()> {
        let expr = path::translate(expr);
        let sql = ddl::create_index(&CreateIndex {
            table: &self.name,
            expr: &expr,
            name: None,
            unique,
        });
        debug!("{}", sql);
        self.conn.execute(&sql, [])?;
        Ok(())
    }

    fn statement<'a>(&self, head: &[Piece<'a>], fragments: &[&'a Fragment]) -> Statement {
        Statement::assemble(
            head.iter()
                .copied()
                .chain(fragments.iter().copied().map(Piece::Fragment)),
        )
    }

    fn execute(&self, stmt: &Statement) -> Result<usize> {
        debug!("{} ({} args)", stmt.text(), stmt.args().len());
        let mut prepared = self.conn.prepare_cached(stmt.text())?;
        Ok(prepared.execute(rusqlite::params_from_iter(stmt.args().iter()))?)
    }

    /// Serialize a document, giving it an id if it doesn't have one.
    fn prepare_insert(&self, doc: D) -> Result<(String, D)> {
        let mut value = serde_json::to_value(&doc)?;
        if !document::ensure_id(&mut value, &*self.id_generator)? {
            return Ok((serde_json::to_string(&value)?, doc));
        }

        let json = serde_json::to_string(&value)?;
        Ok((json, serde_json::from_value(value)?))
    }

    /// Insert a document, returning it with its id.
    ///
    /// An existing id is kept as is; a duplicate fails with SQLite's constraint violation.
    pub fn insert(&self, doc: D) -> Result<D> {
        let mut inserted = self.insert_all([doc])?;
        Ok(inserted
            .pop()
            .expect("Inserting one document yields one document"))
    }

    /// Insert several documents with one prepared statement.
    ///
    /// Stops at the first failure; documents before it stay inserted unless the caller is in a transaction.
    pub fn insert_all(&self, docs: impl IntoIterator<Item = D>) -> Result<Vec<D>> {
        let sql = ddl::insert_statement(&self.name);
        debug!("{}", sql);
        let mut statement = self.conn.prepare_cached(&sql)?;

        let mut ret = vec![];
        for doc in docs {
            let (json, doc) = self.prepare_insert(doc)?;
            statement.execute(rusqlite::params![json])?;
            ret.push(doc);
        }

        Ok(ret)
    }

    /// All documents matching the fragments, in whatever order SQLite returns them unless the fragments order them.
    pub fn all(&self, fragments: &[&Fragment]) -> Result<Vec<D>> {
        let select = format!("select json({}) from", path::DATA_COLUMN);
        let stmt = self.statement(&[Piece::Raw(&select), Piece::Raw(&self.name)], fragments);
        debug!("{} ({} args)", stmt.text(), stmt.args().len());

        let mut prepared = self.conn.prepare_cached(stmt.text())?;
        let rows = prepared
            .query_map(rusqlite::params_from_iter(stmt.args().iter()), |r| {
                r.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut ret = Vec::with_capacity(rows.len());
        for r in rows {
            ret.push(serde_json::from_str(&r)?);
        }
        Ok(ret)
    }

    /// The first document matching the fragments.
    pub fn get(&self, fragments: &[&Fragment]) -> Result<Option<D>> {
        let limit = Fragment::limit(1);
        let mut with_limit = fragments.to_vec();
        with_limit.push(&limit);
        Ok(self.all(&with_limit)?.into_iter().next())
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<D>> {
        self.get(&[&by_id(id)])
    }

    /// Delete matching documents, returning how many were deleted.  With no fragments, this deletes everything.
    pub fn delete(&self, fragments: &[&Fragment]) -> Result<usize> {
        let stmt = self.statement(&[Piece::Raw("delete from"), Piece::Raw(&self.name)], fragments);
        self.execute(&stmt)
    }

    /// Merge-patch every matching document with `partial`, returning how many matched.
    ///
    /// Keys set to null in `partial` are removed, objects merge recursively, and everything else replaces.  See
    /// [document::merge_patch].
    pub fn patch(&self, partial: &impl Serialize, fragments: &[&Fragment]) -> Result<usize> {
        let set = Fragment::builder()
            .text("set data = jsonb_patch(data, ")
            .value(serde_json::to_string(partial)?)
            .text(")")
            .build();
        self.update(&set, fragments)
    }

    /// Overwrite every matching document with `doc`, returning how many matched.
    ///
    /// This is a full replacement: if `doc` has no id, neither do the stored documents afterwards.
    pub fn replace(&self, doc: &D, fragments: &[&Fragment]) -> Result<usize> {
        let set = Fragment::builder()
            .text("set data = jsonb(")
            .value(serde_json::to_string(doc)?)
            .text(")")
            .build();
        self.update(&set, fragments)
    }

    fn update(&self, set: &Fragment, fragments: &[&Fragment]) -> Result<usize> {
        let stmt = self.statement(
            &[Piece::Raw("update"), Piece::Raw(&self.name), Piece::Fragment(set)],
            fragments,
        );
        self.execute(&stmt)
    }

    /// The `explain query plan` lines for the query [Table::all] would run.
    pub fn explain(&self, fragments: &[&Fragment]) -> Result<Vec<String>> {
        let select = format!("explain query plan select json({}) from", path::DATA_COLUMN);
        let stmt = self.statement(&[Piece::Raw(&select), Piece::Raw(&self.name)], fragments);
        let mut prepared = self.conn.prepare(stmt.text())?;
        let details = prepared
            .query_map(rusqlite::params_from_iter(stmt.args().iter()), |r| {
                r.get::<_, String>(3)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(details)
    }
}

/// `where $id = ?`.
pub fn by_id(id: &str) -> Fragment {
    Fragment::builder().text("where $id = ").value(id).build()
}
