//! Support types shared by the generated modules.

use std::error::Error;
use std::fmt;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};

/// Failure of a generated accessor.
#[derive(Debug)]
pub enum DatabaseError {
    Sqlite(rusqlite::Error),
    /// A getter was called on a field that was never set.
    Unset(&'static str),
    /// A statement expected to return a row returned none.
    NoRow(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::Sqlite(e) => write!(f, "database error: {e}"),
            DatabaseError::Unset(field) => write!(f, "field {field} is unset"),
            DatabaseError::NoRow(stmt) => write!(f, "statement returned no row: {stmt}"),
        }
    }
}

impl Error for DatabaseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DatabaseError::Sqlite(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(e: rusqlite::Error) -> Self {
        DatabaseError::Sqlite(e)
    }
}

/// A field value that may not have been set yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Slot<T> {
    #[default]
    Unset,
    Set(T),
}

impl<T> Slot<T> {
    pub fn get(&self, field: &'static str) -> Result<&T, DatabaseError> {
        match self {
            Slot::Set(value) => Ok(value),
            Slot::Unset => Err(DatabaseError::Unset(field)),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Slot::Set(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Slot::Set(value) => Some(value),
            Slot::Unset => None,
        }
    }
}

/// A `NUMERIC` value, stored as whichever of integer or real fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Integer(i64),
    Real(f64),
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::Integer(0)
    }
}

impl ToSql for Numeric {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match *self {
            Numeric::Integer(i) => Value::Integer(i),
            Numeric::Real(f) => Value::Real(f),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

impl FromSql for Numeric {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(i) => Ok(Numeric::Integer(i)),
            ValueRef::Real(f) => Ok(Numeric::Real(f)),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// `INSERT` writing only `columns` and reading back `returning`.
pub fn insert_statement(table: &str, columns: &[&str], returning: &[&str]) -> String {
    let returning = returning.join(", ");
    if columns.is_empty() {
        return format!("INSERT INTO {table} DEFAULT VALUES RETURNING {returning}");
    }
    let markers = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({markers}) RETURNING {returning}",
        columns.join(", ")
    )
}
