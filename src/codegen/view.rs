//! Generated module for one view: a read-only row type.

use tracing::debug;

use super::accessor::{Imports, Storage, literal, write_query};
use super::query::{CompiledQuery, Target};
use super::writer::{GeneratedFile, Writer};
use crate::schema::{Schema, View};

pub fn generate_view(
    schema: &Schema,
    view: &View,
    queries: &[CompiledQuery],
    package: &str,
) -> GeneratedFile {
    let target = Target::from_view(schema, view);
    let mut imports = Imports::default();

    let mut body = Writer::new();
    let w = &mut body;
    w.line("#[derive(Debug, Clone, Default, PartialEq)]");
    w.block(format!("pub struct {}", view.type_name), |w| {
        for field in &target.fields {
            imports.column_type(field.ty);
            w.line(format!("pub {}: {},", field.field_name, field.ty.rust_type()));
        }
    });
    w.blank();

    w.block(format!("impl {}", view.type_name), |w| {
        w.line(format!("pub const VIEW: &str = {};", literal(&target.sql)));
        w.blank();

        let args: Vec<String> = target
            .fields
            .iter()
            .map(|f| format!("{}: {}", f.field_name, f.ty.rust_type()))
            .collect();
        w.block(format!("pub fn new({}) -> Self", args.join(", ")), |w| {
            w.block("Self", |w| {
                for field in &target.fields {
                    w.line(format!("{},", field.field_name));
                }
            });
        });

        for query in queries {
            w.blank();
            write_query(w, &target, query, Storage::Plain, &mut imports);
        }
    });

    let mut out = Writer::new();
    out.line(format!(
        "//! Rows of the `{}` view. Generated by tablegen; do not edit.",
        view.ident.name
    ));
    out.blank();
    imports.write(&mut out, package);
    out.blank();

    debug!(view = %view.ident, queries = queries.len(), "generated view module");
    GeneratedFile::new(
        format!("{}.rs", view.module_name),
        out.finish() + &body.finish(),
    )
}
