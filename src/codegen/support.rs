//! Shared units every generated package carries: converters and utils.

use super::writer::{GeneratedFile, Writer};
use crate::sql::types::Conversion;

/// Stored text layout of each chrono-backed conversion.
fn text_format(conversion: Conversion) -> Option<(&'static str, &'static str, &'static str)> {
    match conversion {
        Conversion::Date => Some(("NaiveDate", "DATE_FORMAT", "%Y-%m-%d")),
        Conversion::Time => Some(("NaiveTime", "TIME_FORMAT", "%H:%M:%S%.f")),
        Conversion::DateTime => Some(("NaiveDateTime", "DATETIME_FORMAT", "%Y-%m-%d %H:%M:%S%.f")),
        Conversion::Decimal => None,
    }
}

pub fn converters_file() -> GeneratedFile {
    let mut w = Writer::new();
    w.line("//! Conversions between field types and the values SQLite stores.");
    w.blank();
    w.line("use std::str::FromStr;");
    w.blank();
    w.line("use chrono::{NaiveDate, NaiveDateTime, NaiveTime};");
    w.line("use rusqlite::types::{Type, Value};");
    w.line("use rust_decimal::Decimal;");
    w.blank();
    for conversion in Conversion::ALL {
        if let Some((_, constant, format)) = text_format(conversion) {
            w.line(format!("const {constant}: &str = {format:?};"));
        }
    }
    w.line("const DATETIME_T_FORMAT: &str = \"%Y-%m-%dT%H:%M:%S%.f\";");
    w.blank();
    w.line("fn conversion_error<E>(column: usize, ty: Type, err: E) -> rusqlite::Error");
    w.line("where");
    w.indented(|w| w.line("E: std::error::Error + Send + Sync + 'static,"));
    w.line("{");
    w.indented(|w| {
        w.line("rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(err))");
    });
    w.line("}");

    for conversion in Conversion::ALL {
        match text_format(conversion) {
            Some((ty, constant, _)) => write_text_conversion(&mut w, conversion, ty, constant),
            None => write_decimal_conversion(&mut w),
        }
        write_optional_wrappers(&mut w, conversion);
    }

    GeneratedFile::new("converters.rs", w.finish())
}

fn write_text_conversion(w: &mut Writer, conversion: Conversion, ty: &str, constant: &str) {
    let to_sql = conversion.to_sql_fn(false);
    let from_sql = conversion.from_sql_fn(false);

    w.blank();
    w.block(format!("pub fn {to_sql}(value: &{ty}) -> String"), |w| {
        w.line(format!("value.format({constant}).to_string()"));
    });
    w.blank();
    w.block(
        format!("pub fn {from_sql}(column: usize, value: String) -> rusqlite::Result<{ty}>"),
        |w| {
            if conversion == Conversion::DateTime {
                w.line(format!("{ty}::parse_from_str(&value, {constant})"));
                w.indented(|w| {
                    w.line(format!(
                        ".or_else(|_| {ty}::parse_from_str(&value, DATETIME_T_FORMAT))"
                    ));
                    w.line(".map_err(|e| conversion_error(column, Type::Text, e))");
                });
            } else {
                w.line(format!(
                    "{ty}::parse_from_str(&value, {constant}).map_err(|e| conversion_error(column, Type::Text, e))"
                ));
            }
        },
    );
}

fn write_decimal_conversion(w: &mut Writer) {
    w.blank();
    w.block("pub fn decimal_to_sql(value: &Decimal) -> String", |w| {
        w.line("value.to_string()");
    });
    w.blank();
    w.block(
        "pub fn decimal_from_sql(column: usize, value: Value) -> rusqlite::Result<Decimal>",
        |w| {
            w.block("match value", |w| {
                w.line("Value::Integer(i) => Ok(Decimal::from(i)),");
                w.line(
                    "Value::Real(f) => Decimal::try_from(f).map_err(|e| conversion_error(column, Type::Real, e)),",
                );
                w.line(
                    "Value::Text(s) => Decimal::from_str(&s).map_err(|e| conversion_error(column, Type::Text, e)),",
                );
                w.line(
                    "other => Err(rusqlite::Error::InvalidColumnType(column, String::new(), other.data_type())),",
                );
            });
        },
    );
}

fn write_optional_wrappers(w: &mut Writer, conversion: Conversion) {
    let (ty, stored) = match text_format(conversion) {
        Some((ty, _, _)) => (ty, "String"),
        None => ("Decimal", "Value"),
    };
    let to_sql = conversion.to_sql_fn(false);
    let from_sql = conversion.from_sql_fn(false);
    let sql_out = if stored == "Value" { "String" } else { stored };

    w.blank();
    w.block(
        format!(
            "pub fn {}(value: &Option<{ty}>) -> Option<{sql_out}>",
            conversion.to_sql_fn(true)
        ),
        |w| w.line(format!("value.as_ref().map({to_sql})")),
    );
    w.blank();
    w.block(
        format!(
            "pub fn {}(column: usize, value: Option<{stored}>) -> rusqlite::Result<Option<{ty}>>",
            conversion.from_sql_fn(true)
        ),
        |w| w.line(format!("value.map(|v| {from_sql}(column, v)).transpose()")),
    );
}

pub fn utils_file() -> GeneratedFile {
    let mut w = Writer::new();
    w.line("//! Support types shared by the generated modules.");
    w.blank();
    w.line("use std::error::Error;");
    w.line("use std::fmt;");
    w.blank();
    w.line(
        "use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};",
    );
    w.blank();

    w.line("/// Failure of a generated accessor.");
    w.line("#[derive(Debug)]");
    w.block("pub enum DatabaseError", |w| {
        w.line("Sqlite(rusqlite::Error),");
        w.line("/// A getter was called on a field that was never set.");
        w.line("Unset(&'static str),");
        w.line("/// A statement expected to return a row returned none.");
        w.line("NoRow(String),");
    });
    w.blank();
    w.block("impl fmt::Display for DatabaseError", |w| {
        w.block("fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result", |w| {
            w.block("match self", |w| {
                w.line("DatabaseError::Sqlite(e) => write!(f, \"database error: {e}\"),");
                w.line("DatabaseError::Unset(field) => write!(f, \"field {field} is unset\"),");
                w.line(
                    "DatabaseError::NoRow(stmt) => write!(f, \"statement returned no row: {stmt}\"),",
                );
            });
        });
    });
    w.blank();
    w.block("impl Error for DatabaseError", |w| {
        w.block("fn source(&self) -> Option<&(dyn Error + 'static)>", |w| {
            w.block("match self", |w| {
                w.line("DatabaseError::Sqlite(e) => Some(e),");
                w.line("_ => None,");
            });
        });
    });
    w.blank();
    w.block("impl From<rusqlite::Error> for DatabaseError", |w| {
        w.block("fn from(e: rusqlite::Error) -> Self", |w| {
            w.line("DatabaseError::Sqlite(e)");
        });
    });
    w.blank();

    w.line("/// A field value that may not have been set yet.");
    w.line("#[derive(Debug, Clone, Default, PartialEq)]");
    w.block("pub enum Slot<T>", |w| {
        w.line("#[default]");
        w.line("Unset,");
        w.line("Set(T),");
    });
    w.blank();
    w.block("impl<T> Slot<T>", |w| {
        w.block("pub fn get(&self, field: &'static str) -> Result<&T, DatabaseError>", |w| {
            w.block("match self", |w| {
                w.line("Slot::Set(value) => Ok(value),");
                w.line("Slot::Unset => Err(DatabaseError::Unset(field)),");
            });
        });
        w.blank();
        w.block("pub fn is_set(&self) -> bool", |w| {
            w.line("matches!(self, Slot::Set(_))");
        });
        w.blank();
        w.block("pub fn as_option(&self) -> Option<&T>", |w| {
            w.block("match self", |w| {
                w.line("Slot::Set(value) => Some(value),");
                w.line("Slot::Unset => None,");
            });
        });
    });
    w.blank();

    w.line("/// A `NUMERIC` value, stored as whichever of integer or real fits.");
    w.line("#[derive(Debug, Clone, Copy, PartialEq)]");
    w.block("pub enum Numeric", |w| {
        w.line("Integer(i64),");
        w.line("Real(f64),");
    });
    w.blank();
    w.block("impl Default for Numeric", |w| {
        w.block("fn default() -> Self", |w| w.line("Numeric::Integer(0)"));
    });
    w.blank();
    w.block("impl ToSql for Numeric", |w| {
        w.block("fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>>", |w| {
            w.block_with("let value = match *self", "};", |w| {
                w.line("Numeric::Integer(i) => Value::Integer(i),");
                w.line("Numeric::Real(f) => Value::Real(f),");
            });
            w.line("Ok(ToSqlOutput::Owned(value))");
        });
    });
    w.blank();
    w.block("impl FromSql for Numeric", |w| {
        w.block("fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self>", |w| {
            w.block("match value", |w| {
                w.line("ValueRef::Integer(i) => Ok(Numeric::Integer(i)),");
                w.line("ValueRef::Real(f) => Ok(Numeric::Real(f)),");
                w.line("_ => Err(FromSqlError::InvalidType),");
            });
        });
    });
    w.blank();

    w.line("/// `INSERT` writing only `columns` and reading back `returning`.");
    w.block(
        "pub fn insert_statement(table: &str, columns: &[&str], returning: &[&str]) -> String",
        |w| {
            w.line("let returning = returning.join(\", \");");
            w.block("if columns.is_empty()", |w| {
                w.line(
                    "return format!(\"INSERT INTO {table} DEFAULT VALUES RETURNING {returning}\");",
                );
            });
            w.line("let markers = vec![\"?\"; columns.len()].join(\", \");");
            w.line("format!(");
            w.indented(|w| {
                w.line("\"INSERT INTO {table} ({}) VALUES ({markers}) RETURNING {returning}\",");
                w.line("columns.join(\", \")");
            });
            w.line(")");
        },
    );

    GeneratedFile::new("utils.rs", w.finish())
}
