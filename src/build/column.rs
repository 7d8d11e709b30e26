use tracing::trace;

use super::BuildContext;
use super::reference::resolve_reference;
use crate::error::{Error, Result};
use crate::schema::{Column, DefaultValue, names};
use crate::sql::ast::{ColumnConstraint, ColumnDef, Literal};
use crate::sql::types::{ColumnType, map_type};

/// Build one column definition against the tables built so far.
pub fn build_column(ctx: &BuildContext, def: &ColumnDef) -> Result<Column> {
    let mut nullable = true;
    let mut primary_key = false;
    let mut default = DefaultValue::None;
    let mut references = None;

    for constraint in &def.constraints {
        match constraint {
            ColumnConstraint::PrimaryKey => primary_key = true,
            ColumnConstraint::NotNull => nullable = false,
            ColumnConstraint::Null => nullable = true,
            ColumnConstraint::Default(literal) => default = default_value(literal),
            ColumnConstraint::References(reference) => {
                let mut targets = resolve_reference(ctx.schema(), reference)?;
                if targets.len() != 1 {
                    return Err(Error::Structural(format!(
                        "column {} references {} columns of {}",
                        def.name,
                        targets.len(),
                        reference.table
                    )));
                }
                references = targets.pop();
            }
            ColumnConstraint::AutoIncrement | ColumnConstraint::Unique => {}
            ColumnConstraint::Check(_)
            | ColumnConstraint::Collate(_)
            | ColumnConstraint::Generated(_) => {
                return Err(Error::Structural(format!(
                    "unsupported column constraint {} on column {}",
                    constraint.kind(),
                    def.name
                )));
            }
        }
    }

    let sql_type = def.sql_type.clone().unwrap_or_default();
    let base = map_type(&sql_type).ok_or_else(|| Error::TypeMapping {
        sql_type: sql_type.clone(),
        column: def.name.name.clone(),
    })?;
    let ty = ColumnType::new(base, nullable);
    trace!(column = %def.name, ty = %ty, "built column");

    Ok(Column {
        field_name: names::field_name(&def.name.name),
        ident: def.name.clone(),
        sql_type,
        ty,
        default,
        primary_key,
        references,
    })
}

fn default_value(literal: &Literal) -> DefaultValue {
    match literal {
        Literal::Str(s) => DefaultValue::Str(s.clone()),
        Literal::Int(i) => DefaultValue::Int(*i),
        Literal::Float(f) => DefaultValue::Float(*f),
        Literal::Null => DefaultValue::None,
        Literal::Expression(e) => DefaultValue::Expression(e.clone()),
    }
}
