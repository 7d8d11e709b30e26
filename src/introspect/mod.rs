//! Schema metadata sources.

mod script;
#[cfg(not(target_arch = "wasm32"))]
mod sqlite;

pub use script::ScriptSource;
#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::SqliteSource;

use crate::error::Result;
use crate::sql::Dialect;

/// A named schema object and the SQL that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaObject {
    pub name: String,
    pub sql: String,
}

impl SchemaObject {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub unique: bool,
}

/// Read-only access to a database's structural metadata.
///
/// Tables are reported in creation order; a table's foreign keys may only
/// point at tables reported before it.
pub trait IntrospectionSource {
    fn dialect(&self) -> Dialect;

    fn tables(&self) -> Result<Vec<SchemaObject>>;

    /// Indices of `table`, in creation order.
    fn indices(&self, table: &str) -> Result<Vec<IndexInfo>>;

    /// Member column names of `index`, in index order.
    fn index_columns(&self, index: &str) -> Result<Vec<String>>;

    fn views(&self) -> Result<Vec<SchemaObject>>;
}
