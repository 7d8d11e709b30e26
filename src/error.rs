//! Errors raised while building a schema or generating code.

use std::path::PathBuf;

use thiserror::Error;

use crate::sql::SqlParseError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A statement or expression has a shape the analyser does not handle.
    #[error("Unsupported structure: {0}")]
    Structural(String),
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),
    #[error("No type mapping for `{sql_type}` (column {column})")]
    TypeMapping { sql_type: String, column: String },
    #[error("Invalid type `{ty}` for query parameter {name}")]
    InvalidParameterType { name: String, ty: String },
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Parse error: {0}")]
    Parse(#[from] SqlParseError),
    #[cfg(not(target_arch = "wasm32"))]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// An error annotated with the entity it occurred in.
    #[error("In {kind} {name}: {source}")]
    Context {
        kind: &'static str,
        name: String,
        source: Box<Error>,
    },
}

impl Error {
    pub fn within(self, kind: &'static str, name: impl Into<String>) -> Self {
        Error::Context {
            kind,
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Annotate unless an inner step already named the entity.
    pub fn ensure_within(self, kind: &'static str, name: impl Into<String>) -> Self {
        match self {
            Error::Context { .. } => self,
            other => other.within(kind, name),
        }
    }

    /// The innermost error, past any context annotations.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attach entity context to a failing result.
pub trait ResultExt<T> {
    fn within(self, kind: &'static str, name: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn within(self, kind: &'static str, name: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.within(kind, name))
    }
}
