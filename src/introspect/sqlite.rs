//! Live SQLite database source.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use super::{IndexInfo, IntrospectionSource, SchemaObject};
use crate::error::{Error, Result};
use crate::sql::Dialect;

/// Reads `sqlite_master` and the index pragmas of an open connection.
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    /// Open a database file read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening database");
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn objects(&self, kind: &str) -> Result<Vec<SchemaObject>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, sql FROM sqlite_master WHERE type = ?1 AND sql IS NOT NULL ORDER BY rowid",
        )?;
        let rows = stmt.query_map([kind], |row| {
            Ok(SchemaObject {
                name: row.get(0)?,
                sql: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl IntrospectionSource for SqliteSource {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn tables(&self) -> Result<Vec<SchemaObject>> {
        self.objects("table")
    }

    fn indices(&self, table: &str) -> Result<Vec<IndexInfo>> {
        // index_list reports the newest index first.
        let mut stmt = self
            .conn
            .prepare("SELECT name, \"unique\" FROM pragma_index_list(?1) ORDER BY seq DESC")?;
        let rows = stmt.query_map([table], |row| {
            Ok(IndexInfo {
                name: row.get(0)?,
                unique: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn index_columns(&self, index: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
        let names = stmt
            .query_map([index], |row| row.get::<_, Option<String>>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        names
            .into_iter()
            .map(|name| {
                name.ok_or_else(|| {
                    Error::Structural(format!("index {index} has an expression member"))
                })
            })
            .collect()
    }

    fn views(&self) -> Result<Vec<SchemaObject>> {
        self.objects("view")
    }
}
