//! Pieces shared by the table and view generators.

use std::collections::BTreeSet;

use super::query::{CompiledQuery, Target};
use super::writer::Writer;
use crate::sql::types::{ColumnType, TargetType};

/// `use` items a generated module needs, collected while its body is
/// written.
#[derive(Debug, Default)]
pub(crate) struct Imports {
    chrono: BTreeSet<&'static str>,
    decimal: bool,
    rusqlite: BTreeSet<&'static str>,
    converters: BTreeSet<String>,
    utils: BTreeSet<&'static str>,
}

impl Imports {
    pub fn rusqlite(&mut self, item: &'static str) {
        self.rusqlite.insert(item);
    }

    pub fn utils(&mut self, item: &'static str) {
        self.utils.insert(item);
    }

    pub fn converter(&mut self, name: String) {
        self.converters.insert(name);
    }

    pub fn column_type(&mut self, ty: ColumnType) {
        match ty.base {
            TargetType::Date => {
                self.chrono.insert("NaiveDate");
            }
            TargetType::Time => {
                self.chrono.insert("NaiveTime");
            }
            TargetType::DateTime => {
                self.chrono.insert("NaiveDateTime");
            }
            TargetType::Decimal => self.decimal = true,
            TargetType::Numeric => {
                self.utils.insert("Numeric");
            }
            TargetType::Integer
            | TargetType::Text
            | TargetType::Binary
            | TargetType::Floating
            | TargetType::Boolean => {}
        }
    }

    pub fn write(&self, w: &mut Writer, package: &str) {
        if !self.chrono.is_empty() {
            w.line(format!("use chrono::{};", group(self.chrono.iter().copied())));
        }
        if !self.rusqlite.is_empty() {
            w.line(format!("use rusqlite::{};", group(self.rusqlite.iter().copied())));
        }
        if self.decimal {
            w.line("use rust_decimal::Decimal;");
        }
        w.blank();
        if !self.converters.is_empty() {
            w.line(format!(
                "use crate::{package}::converters::{};",
                group(self.converters.iter().map(String::as_str))
            ));
        }
        if !self.utils.is_empty() {
            w.line(format!(
                "use crate::{package}::utils::{};",
                group(self.utils.iter().copied())
            ));
        }
    }
}

/// `Name` or `{A, B}`.
fn group<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let items: Vec<_> = items.collect();
    match items.as_slice() {
        [only] => (*only).to_string(),
        _ => format!("{{{}}}", items.join(", ")),
    }
}

/// A Rust string literal for `s`.
pub(crate) fn literal(s: &str) -> String {
    format!("{s:?}")
}

/// Expression reading result column `index` of `row` as `ty`.
pub(crate) fn read_value(ty: ColumnType, index: usize, imports: &mut Imports) -> String {
    match ty.conversion() {
        Some(conversion) => {
            let func = conversion.from_sql_fn(ty.nullable);
            imports.converter(func.clone());
            format!("{func}({index}, row.get({index})?)?")
        }
        None => format!("row.get({index})?"),
    }
}

/// Bindable expression for `value`, a reference to a `ty` value.
pub(crate) fn bind_value(ty: ColumnType, value: &str, imports: &mut Imports) -> String {
    match ty.conversion() {
        Some(conversion) => {
            let func = conversion.to_sql_fn(ty.nullable);
            imports.converter(func.clone());
            format!("{func}({value})")
        }
        None => value.to_string(),
    }
}

/// How a generated type stores its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Storage {
    /// Fields are `Slot<T>` and may be unset.
    Slots,
    /// Fields are plain values.
    Plain,
}

/// `Self { .. }` built from the result columns of a row.
pub(crate) fn write_row_literal(
    w: &mut Writer,
    target: &Target,
    columns: &[usize],
    storage: Storage,
    imports: &mut Imports,
) {
    w.block_with("Ok(Self", "})", |w| {
        let mut written = BTreeSet::new();
        for (position, &field_index) in columns.iter().enumerate() {
            if !written.insert(field_index) {
                continue;
            }
            let field = &target.fields[field_index];
            let value = read_value(field.ty, position, imports);
            match storage {
                Storage::Slots => {
                    imports.utils("Slot");
                    w.line(format!("{}: Slot::Set({value}),", field.field_name));
                }
                Storage::Plain => w.line(format!("{}: {value},", field.field_name)),
            }
        }
        if written.len() < target.fields.len() {
            w.line("..Default::default()");
        }
    });
}

/// The SQL constant and accessor method of one compiled query.
pub(crate) fn write_query(
    w: &mut Writer,
    target: &Target,
    query: &CompiledQuery,
    storage: Storage,
    imports: &mut Imports,
) {
    let constant = query.const_name();
    imports.utils("DatabaseError");
    imports.rusqlite("params");

    let arguments = query.arguments();
    for param in &arguments {
        imports.column_type(param.ty);
    }
    let signature: Vec<String> = arguments
        .iter()
        .map(|p| format!("{}: {}", p.ident(), p.ty.rust_type()))
        .collect();
    let bindings: Vec<String> = query
        .params
        .iter()
        .map(|p| bind_value(p.ty, &format!("&{}", p.ident()), imports))
        .collect();
    let bindings = bindings.join(", ");

    w.line(format!("pub const {constant}: &str = {};", literal(&query.sql)));
    w.blank();

    if query.one {
        imports.rusqlite("Connection");
        imports.rusqlite("OptionalExtension");
        let mut args = vec!["conn: &Connection".to_string()];
        args.extend(signature);
        w.block(
            format!(
                "pub fn {}({}) -> Result<Option<Self>, DatabaseError>",
                query.name,
                args.join(", ")
            ),
            |w| {
                w.line("let found = conn");
                w.indented(|w| {
                    w.block_with(
                        format!(".query_row(Self::{constant}, params![{bindings}], |row|"),
                        "})",
                        |w| write_row_literal(w, target, &query.columns, storage, imports),
                    );
                    w.line(".optional()?;");
                });
                w.line("Ok(found)");
            },
        );
    } else {
        imports.rusqlite("Statement");
        let mut args = vec!["stmt: &'s mut Statement<'_>".to_string()];
        args.extend(signature);
        w.line(format!(
            "/// Rows of [`Self::{constant}`], read lazily from a statement prepared with it."
        ));
        w.block(
            format!(
                "pub fn {}<'s>({}) -> Result<impl Iterator<Item = rusqlite::Result<Self>> + 's, DatabaseError>",
                query.name,
                args.join(", ")
            ),
            |w| {
                w.block_with(
                    format!("let rows = stmt.query_map(params![{bindings}], |row|"),
                    "})?;",
                    |w| write_row_literal(w, target, &query.columns, storage, imports),
                );
                w.line("Ok(rows)");
            },
        );
    }
}
