use tracing::debug;

use super::BuildContext;
use super::column::build_column;
use super::reference::resolve_reference;
use crate::error::{Error, Result};
use crate::schema::Table;
use crate::sql::ast::{CreateTable, Ident, TableElement};

/// Build a table from its definition. Columns come first in declaration
/// order; table-level keys are applied as they appear.
pub fn build_table(ctx: &BuildContext, create: &CreateTable) -> Result<Table> {
    let mut table = Table::new(create.name.clone());
    table.without_rowid = create.without_rowid;

    for element in &create.elements {
        match element {
            TableElement::Column(def) => {
                let column = build_column(ctx, def)?;
                if let Some(earlier) = table
                    .columns
                    .iter()
                    .find(|c| c.field_name == column.field_name)
                {
                    return Err(Error::Structural(format!(
                        "columns {} and {} both map to field {}",
                        earlier.ident, column.ident, column.field_name
                    )));
                }
                table.columns.push(column);
            }
            TableElement::PrimaryKey(names) => {
                for name in names {
                    let index = local_column(&table, name)?;
                    table.columns[index].primary_key = true;
                }
            }
            TableElement::ForeignKey { columns, reference } => {
                let targets = resolve_reference(ctx.schema(), reference)?;
                if targets.len() != columns.len() {
                    return Err(Error::Structural(format!(
                        "foreign key names {} columns but references {}",
                        columns.len(),
                        targets.len()
                    )));
                }
                for (name, target) in columns.iter().zip(targets) {
                    let index = local_column(&table, name)?;
                    table.columns[index].references = Some(target);
                }
            }
            TableElement::Unique(_) => {}
            TableElement::Check(_) => {
                return Err(Error::Structural(format!(
                    "unsupported table constraint {}",
                    element.kind()
                )));
            }
        }
    }

    debug!(
        table = %table.ident,
        columns = table.columns.len(),
        primary_key = table.primary_key().len(),
        "built table"
    );
    Ok(table)
}

fn local_column(table: &Table, name: &Ident) -> Result<usize> {
    table
        .find_column(name)
        .or_else(|| table.find_column_by_name(&name.name))
        .ok_or_else(|| {
            Error::UnresolvedReference(format!("column {name} not found in table {}", table.ident))
        })
}

#[cfg(test)]
mod tests {
    use crate::build::{BuildContext, build_table_sql};
    use crate::error::Error;
    use crate::schema::{ColumnRef, TableId};
    use crate::sql::Dialect;

    fn context(statements: &[&str]) -> BuildContext {
        let mut ctx = BuildContext::new(Dialect::Sqlite);
        for sql in statements {
            build_table_sql(&mut ctx, sql).unwrap();
        }
        ctx
    }

    #[test]
    fn test_column_order_and_count() {
        let ctx = context(&[
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL, score REAL)",
        ]);
        let table = &ctx.schema().tables[0];
        let names: Vec<_> = table.columns.iter().map(|c| c.ident.name.as_str()).collect();
        assert_eq!(names, ["id", "name", "score"]);
        assert_eq!(table.type_name, "T");
        assert_eq!(table.primary_key(), vec![0]);
    }

    #[test]
    fn test_composite_primary_key() {
        let ctx = context(&[
            "CREATE TABLE pairs (a INTEGER, b TEXT, c INTEGER, PRIMARY KEY (c, a))",
        ]);
        let table = &ctx.schema().tables[0];
        assert_eq!(table.primary_key(), vec![0, 2]);
    }

    #[test]
    fn test_composite_foreign_key() {
        let ctx = context(&[
            "CREATE TABLE parents (x INTEGER, y INTEGER, PRIMARY KEY (x, y))",
            "CREATE TABLE children (id INTEGER PRIMARY KEY, px INTEGER, py INTEGER, \
             FOREIGN KEY (px, py) REFERENCES parents (x, y))",
        ]);
        let child = &ctx.schema().tables[1];
        assert_eq!(
            child.columns[1].references,
            Some(ColumnRef {
                table: TableId(0),
                column: 0
            })
        );
        assert_eq!(
            child.columns[2].references,
            Some(ColumnRef {
                table: TableId(0),
                column: 1
            })
        );
    }

    #[test]
    fn test_forward_reference_is_unresolved() {
        let mut ctx = BuildContext::new(Dialect::Sqlite);
        let err = build_table_sql(
            &mut ctx,
            "CREATE TABLE posts (id INTEGER PRIMARY KEY, author INTEGER REFERENCES users (id))",
        )
        .unwrap_err();
        assert!(matches!(err.root(), Error::UnresolvedReference(_)));
        assert_eq!(
            err.to_string(),
            "In table posts: Unresolved reference: table users not found"
        );
    }

    #[test]
    fn test_self_reference_is_unresolved() {
        let mut ctx = BuildContext::new(Dialect::Sqlite);
        let err = build_table_sql(
            &mut ctx,
            "CREATE TABLE nodes (id INTEGER PRIMARY KEY, parent INTEGER REFERENCES nodes (id))",
        )
        .unwrap_err();
        assert!(matches!(err.root(), Error::UnresolvedReference(_)));
    }

    #[test]
    fn test_unknown_local_column() {
        let mut ctx = BuildContext::new(Dialect::Sqlite);
        let err =
            build_table_sql(&mut ctx, "CREATE TABLE t (a INTEGER, PRIMARY KEY (b))").unwrap_err();
        assert!(matches!(err.root(), Error::UnresolvedReference(_)));
    }

    #[test]
    fn test_table_check_rejected() {
        let mut ctx = BuildContext::new(Dialect::Sqlite);
        let err =
            build_table_sql(&mut ctx, "CREATE TABLE t (a INTEGER, CHECK (a > 0))").unwrap_err();
        assert!(matches!(err.root(), Error::Structural(_)));
        assert!(ctx.schema().tables.is_empty());
    }

    #[test]
    fn test_unique_accepted() {
        let ctx = context(&["CREATE TABLE t (a INTEGER UNIQUE, b TEXT, UNIQUE (a, b))"]);
        assert_eq!(ctx.schema().tables[0].columns.len(), 2);
    }

    #[test]
    fn test_colliding_field_names_rejected() {
        let mut ctx = context(&[]);
        let err = build_table_sql(
            &mut ctx,
            "CREATE TABLE w (userId INTEGER PRIMARY KEY, user_id TEXT)",
        )
        .unwrap_err();
        assert!(matches!(err.root(), Error::Structural(_)));
        assert_eq!(
            err.to_string(),
            "In table w: Unsupported structure: \
             columns userId and user_id both map to field user_id"
        );
    }
}
