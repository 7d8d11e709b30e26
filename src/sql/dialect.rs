//! SQL dialect handling.

use std::fmt;

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// SQLite, including offline DDL scripts written for it.
    #[default]
    Sqlite,
}

impl Dialect {
    /// Resolve a source locator scheme, e.g. `sqlite` in `sqlite://app.db`.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_lowercase().as_str() {
            "sqlite" | "sqlite3" | "ddl" => Some(Self::Sqlite),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
        }
    }

    /// Tables the engine maintains for itself.
    pub fn is_internal_table(self, name: &str) -> bool {
        match self {
            Self::Sqlite => name.starts_with("sqlite_"),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scheme() {
        assert_eq!(Dialect::from_scheme("sqlite"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_scheme("SQLite3"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_scheme("whoosh"), None);
    }

    #[test]
    fn test_internal_tables() {
        assert!(Dialect::Sqlite.is_internal_table("sqlite_sequence"));
        assert!(!Dialect::Sqlite.is_internal_table("users"));
    }
}
