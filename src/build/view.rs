use tracing::debug;

use super::BuildContext;
use super::reference::resolve_column;
use crate::error::{Error, Result};
use crate::schema::{View, ViewColumn, names};
use crate::sql::ast::{ColumnExpr, CreateView, Ident, SelectItem, TableSource};

/// Build a view as a projection of columns of the tables built so far.
pub fn build_view(ctx: &BuildContext, create: &CreateView) -> Result<View> {
    let query = &create.query;
    if !create.columns.is_empty() && create.columns.len() != query.items.len() {
        return Err(Error::Structural(format!(
            "view names {} columns but selects {}",
            create.columns.len(),
            query.items.len()
        )));
    }

    let mut view = View::new(create.name.clone());
    for (position, item) in query.items.iter().enumerate() {
        let (expr, alias) = match item {
            SelectItem::Column(expr) => (expr, None),
            SelectItem::Aliased { item, alias } => match item.as_ref() {
                SelectItem::Column(expr) => (expr, Some(alias.clone())),
                other => return Err(unsupported_item(other)),
            },
            other => return Err(unsupported_item(other)),
        };
        let alias = create.columns.get(position).cloned().or(alias);

        let table = source_table(&query.from, expr)?;
        let column = resolve_column(ctx.schema(), table, &expr.column)?;
        let sql_name = alias
            .as_ref()
            .map_or_else(|| expr.column.name.clone(), |a| a.name.clone());
        let field_name = names::field_name(&sql_name);
        if let Some(earlier) = view.columns.iter().find(|c| c.field_name == field_name) {
            return Err(Error::Structural(format!(
                "columns {} and {sql_name} both map to field {field_name}",
                earlier.sql_name
            )));
        }
        view.columns.push(ViewColumn {
            column,
            field_name,
            sql_name,
            alias,
        });
    }

    debug!(view = %view.ident, columns = view.columns.len(), "built view");
    Ok(view)
}

fn unsupported_item(item: &SelectItem) -> Error {
    let detail = match item {
        SelectItem::Expression(text) => format!(" `{text}`"),
        _ => String::new(),
    };
    Error::Structural(format!("unsupported projection {}{detail}", item.kind()))
}

/// The table a projected column comes from: its qualifier, mapped back
/// through `FROM` aliases, or the only table in `FROM`.
fn source_table<'a>(from: &'a [TableSource], expr: &'a ColumnExpr) -> Result<&'a Ident> {
    match &expr.table {
        Some(qualifier) => Ok(from
            .iter()
            .find(|source| source.alias.as_ref() == Some(qualifier))
            .map_or(qualifier, |source| &source.table)),
        None => match from {
            [only] => Ok(&only.table),
            _ => Err(Error::Structural(format!(
                "column {} needs a table qualifier",
                expr.column
            ))),
        },
    }
}
