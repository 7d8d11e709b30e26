//! Generated module for one table.
//!
//! The struct keeps every field in a `Slot`, so a row can be built up
//! field by field and inserted with only the columns that were set.
//! Columns left unset fall back to their database defaults, and the
//! inserted row is read back with `RETURNING`.

use tracing::debug;

use super::accessor::{Imports, Storage, bind_value, literal, write_query, write_row_literal};
use super::query::{CompiledQuery, Target};
use super::writer::{GeneratedFile, Writer};
use crate::error::{Error, Result};
use crate::schema::{Table, names};

/// Method names every table type defines.
const TABLE_METHODS: &[&str] = &["new", "from_row", "insert", "delete"];

/// `DELETE` of the row identified by the primary key.
pub fn delete_sql(table: &Table) -> Result<String> {
    let key = table.primary_key();
    if key.is_empty() {
        return Err(Error::Structural(format!(
            "table {} has no primary key, so rows cannot be deleted",
            table.ident
        )));
    }
    let condition = key
        .iter()
        .map(|&i| {
            let column = &table.columns[i];
            let op = if column.nullable() { "IS" } else { "=" };
            format!("{} {op} ?", column.ident.to_sql())
        })
        .collect::<Vec<_>>()
        .join(" AND ");
    Ok(format!(
        "DELETE FROM {} WHERE {condition}",
        table.ident.to_sql()
    ))
}

fn all_columns(table: &Table) -> Vec<String> {
    table.columns.iter().map(|c| c.ident.to_sql()).collect()
}

/// Getter name per column; a getter that would shadow another method
/// gets a `get_` prefix.
fn getter_names(table: &Table, queries: &[CompiledQuery]) -> Vec<String> {
    table
        .columns
        .iter()
        .map(|c| {
            let bare = names::unraw(&c.field_name);
            let taken = TABLE_METHODS.contains(&bare)
                || bare == "get"
                || bare.starts_with("set_")
                || queries.iter().any(|q| q.name == bare);
            if taken {
                format!("get_{bare}")
            } else {
                c.field_name.clone()
            }
        })
        .collect()
}

pub fn generate_table(
    table: &Table,
    queries: &[CompiledQuery],
    package: &str,
) -> Result<GeneratedFile> {
    let delete = delete_sql(table)?;
    let target = Target::from_table(table);
    let getters = getter_names(table, queries);
    let mut imports = Imports::default();
    imports.utils("Slot");
    imports.utils("DatabaseError");

    let mut body = Writer::new();
    let w = &mut body;

    w.line("#[derive(Debug, Clone, Default, PartialEq)]");
    w.block(format!("pub struct {}", table.type_name), |w| {
        for column in &table.columns {
            imports.column_type(column.ty);
            w.line(format!(
                "{}: Slot<{}>,",
                column.field_name,
                column.ty.rust_type()
            ));
        }
    });
    w.blank();

    w.block(format!("impl {}", table.type_name), |w| {
        let columns = all_columns(table);
        w.line(format!("pub const TABLE: &str = {};", literal(&table.ident.to_sql())));
        w.line(format!(
            "pub const COLUMNS: [&str; {}] = [{}];",
            columns.len(),
            columns
                .iter()
                .map(|c| literal(c))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        w.line(format!("pub const DELETE: &str = {};", literal(&delete)));
        w.blank();

        write_constructor(w, table);
        for (column, getter) in table.columns.iter().zip(&getters) {
            w.blank();
            let ty = column.ty.rust_type();
            let field = &column.field_name;
            w.block(
                format!("pub fn {getter}(&self) -> Result<&{ty}, DatabaseError>"),
                |w| {
                    w.line(format!(
                        "self.{field}.get({})",
                        literal(names::unraw(field))
                    ))
                },
            );
            w.blank();
            w.block(
                format!("pub fn set_{}(&mut self, value: {ty})", names::unraw(field)),
                |w| w.line(format!("self.{field} = Slot::Set(value);")),
            );
        }
        w.blank();

        imports.rusqlite("Row");
        w.block(
            "pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>",
            |w| {
                let all: Vec<usize> = (0..table.columns.len()).collect();
                write_row_literal(w, &target, &all, Storage::Slots, &mut imports);
            },
        );
        w.blank();

        write_insert(w, table, &mut imports);
        w.blank();
        write_delete(w, table, &getters, &mut imports);

        for query in queries {
            w.blank();
            write_query(w, &target, query, Storage::Slots, &mut imports);
        }
    });

    let mut out = Writer::new();
    out.line(format!(
        "//! `{}` rows. Generated by tablegen; do not edit.",
        table.ident.name
    ));
    out.blank();
    imports.write(&mut out, package);
    out.blank();
    let contents = out.finish() + &body.finish();

    debug!(table = %table.ident, queries = queries.len(), "generated table module");
    Ok(GeneratedFile::new(
        format!("{}.rs", table.module_name),
        contents,
    ))
}

fn write_constructor(w: &mut Writer, table: &Table) {
    let args: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{}: {}", c.field_name, c.ty.rust_type()))
        .collect();
    w.block(format!("pub fn new({}) -> Self", args.join(", ")), |w| {
        w.block("Self", |w| {
            for column in &table.columns {
                w.line(format!(
                    "{0}: Slot::Set({0}),",
                    column.field_name
                ));
            }
        });
    });
}

fn write_insert(w: &mut Writer, table: &Table, imports: &mut Imports) {
    imports.rusqlite("Connection");
    imports.rusqlite("ToSql");
    imports.rusqlite("params_from_iter");
    imports.utils("insert_statement");

    w.line("/// Insert the fields that are set and reload `self` from the stored row.");
    w.block(
        "pub fn insert(&mut self, conn: &Connection) -> Result<(), DatabaseError>",
        |w| {
            w.line("let mut columns: Vec<&str> = Vec::new();");
            w.line("let mut values: Vec<Box<dyn ToSql>> = Vec::new();");
            for (i, column) in table.columns.iter().enumerate() {
                let value = match column.conversion() {
                    Some(_) => bind_value(column.ty, "value", imports),
                    None => "value.clone()".to_string(),
                };
                w.block(
                    format!("if let Slot::Set(value) = &self.{}", column.field_name),
                    |w| {
                        w.line(format!("columns.push(Self::COLUMNS[{i}]);"));
                        w.line(format!("values.push(Box::new({value}));"));
                    },
                );
            }
            w.line("let sql = insert_statement(Self::TABLE, &columns, &Self::COLUMNS);");
            w.line("let mut stmt = conn.prepare(&sql)?;");
            w.line("let mut rows = stmt.query(params_from_iter(values.iter()))?;");
            w.line("let row = rows.next()?.ok_or(DatabaseError::NoRow(sql.clone()))?;");
            w.line("*self = Self::from_row(row)?;");
            w.line("Ok(())");
        },
    );
}

fn write_delete(w: &mut Writer, table: &Table, getters: &[String], imports: &mut Imports) {
    imports.rusqlite("Connection");
    imports.rusqlite("params");

    let bindings: Vec<String> = table
        .primary_key()
        .into_iter()
        .map(|i| {
            let getter = format!("self.{}()?", getters[i]);
            bind_value(table.columns[i].ty, &getter, imports)
        })
        .collect();

    w.line("/// Delete the row with this primary key, returning the number of rows removed.");
    w.block(
        "pub fn delete(&self, conn: &Connection) -> Result<usize, DatabaseError>",
        |w| {
            w.line(format!(
                "let deleted = conn.execute(Self::DELETE, params![{}])?;",
                bindings.join(", ")
            ));
            w.line("Ok(deleted)");
        },
    );
}
