//! Opening configured SQLite connections.
//!
//! Tables only borrow a connection, so nothing forces callers through here, but this is where the pragmas we want for
//! a document store live.
use std::path::Path;

use log::*;

use crate::errors::*;

/// How connections are set up.  Fields left unset on the builder take their values from [ConnectionConfig::default].
#[derive(Clone, Debug, PartialEq, derive_builder::Builder)]
#[builder(default)]
pub struct ConnectionConfig {
    busy_timeout_ms: u32,

    /// Page cache size, in KiB.  SQLite's default is only a couple megabytes since it has to work on phones.
    cache_size_kib: u32,

    wal: bool,

    /// Pages the WAL may grow to before an automatic checkpoint.
    wal_autocheckpoint: u32,

    foreign_keys: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            busy_timeout_ms: 1000,
            cache_size_kib: 100000,
            wal: true,
            wal_autocheckpoint: 10000,
            foreign_keys: true,
        }
    }
}

/// SQL that we run as part of opening a connection.
///
/// When WAL is on we also checkpoint immediately, which truncates a WAL left over from a previous process.
const INITIAL_SQL_TEMPLATE: &str = r#"
PRAGMA busy_timeout = {{ busy_timeout_ms }};
PRAGMA cache_size = -{{ cache_size_kib }};
PRAGMA foreign_keys = {% if foreign_keys %}1{% else %}0{% endif %};
{% if wal -%}
PRAGMA journal_mode = WAL;
PRAGMA wal_autocheckpoint = {{ wal_autocheckpoint }};
PRAGMA wal_checkpoint(full);
{%- endif %}
"#;

fn build_initial_sql(config: &ConnectionConfig) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("busy_timeout_ms", &config.busy_timeout_ms);
    context.insert("cache_size_kib", &config.cache_size_kib);
    context.insert("foreign_keys", &config.foreign_keys);
    context.insert("wal", &config.wal);
    context.insert("wal_autocheckpoint", &config.wal_autocheckpoint);
    Ok(tera::Tera::one_off(INITIAL_SQL_TEMPLATE, &context, false)?)
}

/// Apply the configuration to an already-open connection.
pub fn configure(conn: &rusqlite::Connection, config: &ConnectionConfig) -> Result<()> {
    let sql = build_initial_sql(config)?;
    debug!("Configuring connection: {}", sql.trim());
    conn.execute_batch(&sql)?;
    Ok(())
}

pub fn open(path: &Path, config: &ConnectionConfig) -> Result<rusqlite::Connection> {
    info!("Opening document store at {}", path.display());
    let conn = rusqlite::Connection::open(path)?;
    configure(&conn, config)?;
    Ok(conn)
}

pub fn open_in_memory(config: &ConnectionConfig) -> Result<rusqlite::Connection> {
    let conn = rusqlite::Connection::open_in_memory()?;
    configure(&conn, config)?;
    Ok(conn)
}
