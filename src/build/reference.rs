use crate::error::{Error, Result};
use crate::schema::{ColumnRef, Schema};
use crate::sql::ast::{Ident, Reference};

/// Resolve `table.column` among the tables built so far.
pub fn resolve_column(schema: &Schema, table: &Ident, column: &Ident) -> Result<ColumnRef> {
    let table_id = schema
        .find_table(table)
        .ok_or_else(|| Error::UnresolvedReference(format!("table {table} not found")))?;
    let index = schema.table(table_id).find_column(column).ok_or_else(|| {
        Error::UnresolvedReference(format!("column {column} not found in table {table}"))
    })?;
    Ok(ColumnRef {
        table: table_id,
        column: index,
    })
}

/// Resolve a `REFERENCES` clause to its target columns.
///
/// Without a column list the target is the parent's primary key.
pub fn resolve_reference(schema: &Schema, reference: &Reference) -> Result<Vec<ColumnRef>> {
    if !reference.columns.is_empty() {
        return reference
            .columns
            .iter()
            .map(|column| resolve_column(schema, &reference.table, column))
            .collect();
    }

    let table_id = schema.find_table(&reference.table).ok_or_else(|| {
        Error::UnresolvedReference(format!("table {} not found", reference.table))
    })?;
    let primary_key = schema.table(table_id).primary_key();
    if primary_key.is_empty() {
        return Err(Error::UnresolvedReference(format!(
            "table {} has no primary key to reference",
            reference.table
        )));
    }
    Ok(primary_key
        .into_iter()
        .map(|column| ColumnRef {
            table: table_id,
            column,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_table_sql;
    use crate::build::BuildContext;
    use crate::schema::TableId;
    use crate::sql::Dialect;

    fn context() -> BuildContext {
        let mut ctx = BuildContext::new(Dialect::Sqlite);
        build_table_sql(
            &mut ctx,
            "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT)",
        )
        .unwrap();
        build_table_sql(&mut ctx, r#"CREATE TABLE "Tags" (name TEXT)"#).unwrap();
        ctx
    }

    #[test]
    fn test_resolve_column() {
        let ctx = context();
        let users = Ident::bare("users");
        let email = Ident::bare("email");
        let found = resolve_column(ctx.schema(), &users, &email).unwrap();
        assert_eq!(
            found,
            ColumnRef {
                table: TableId(0),
                column: 1
            }
        );

        let again = resolve_column(ctx.schema(), &users, &email).unwrap();
        assert_eq!(found, again);
    }

    #[test]
    fn test_quoting_is_part_of_identity() {
        let ctx = context();
        let name = Ident::bare("name");
        assert!(resolve_column(ctx.schema(), &Ident::quoted("Tags"), &name).is_ok());

        let err = resolve_column(ctx.schema(), &Ident::bare("Tags"), &name).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference(_)));
    }

    #[test]
    fn test_missing_column() {
        let ctx = context();
        let err =
            resolve_column(ctx.schema(), &Ident::bare("users"), &Ident::bare("name")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unresolved reference: column name not found in table users"
        );
    }

    #[test]
    fn test_reference_defaults_to_primary_key() {
        let ctx = context();
        let reference = Reference {
            table: Ident::bare("users"),
            columns: vec![],
        };
        let targets = resolve_reference(ctx.schema(), &reference).unwrap();
        assert_eq!(
            targets,
            vec![ColumnRef {
                table: TableId(0),
                column: 0
            }]
        );

        let keyless = Reference {
            table: Ident::quoted("Tags"),
            columns: vec![],
        };
        assert!(resolve_reference(ctx.schema(), &keyless).is_err());
    }
}
