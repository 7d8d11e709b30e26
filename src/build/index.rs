use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{Error, Result, ResultExt};
use crate::introspect::IntrospectionSource;
use crate::schema::{Index, Table};
use crate::sql::types::is_integer_type;

use super::BuildContext;

/// Name given to the index SQLite keeps implicitly on a rowid alias.
pub const IMPLICIT_ROWID_INDEX: &str = "implicit_rowid_index";

/// Record introspected indices on every table, then synthesize the
/// implicit rowid indices.
pub fn build_indices(ctx: &mut BuildContext, source: &dyn IntrospectionSource) -> Result<()> {
    for table in ctx.tables_mut() {
        let table_name = table.ident.name.clone();
        for info in source.indices(&table_name).within("table", &table_name)? {
            let members = source
                .index_columns(&info.name)
                .within("index", &info.name)?;
            let index = build_index(table, &info.name, &members, info.unique)
                .within("table", &table_name)?;
            table.indices.push(index);
        }
    }

    for table in ctx.tables_mut() {
        if add_implicit_index(table) {
            debug!(table = %table.ident, "synthesized implicit rowid index");
        }
    }
    Ok(())
}

/// Resolve member names of one index against its table, in order.
pub fn build_index(table: &Table, name: &str, members: &[String], unique: bool) -> Result<Index> {
    if members.is_empty() {
        return Err(Error::MissingData(format!("index {name} reports no columns")));
    }

    let columns = members
        .iter()
        .map(|member| {
            table.find_column_by_name(member).ok_or_else(|| {
                Error::UnresolvedReference(format!(
                    "index {name} names column {member}, not found in table {}",
                    table.ident
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(table = %table.ident, index = name, unique, "recorded index");
    Ok(Index {
        name: name.to_string(),
        columns,
        unique,
    })
}

/// Append the implicit rowid index when the primary key is a single
/// integer column no existing index covers. Returns whether one was added.
pub fn add_implicit_index(table: &mut Table) -> bool {
    let primary_key = table.primary_key();
    let [key] = primary_key.as_slice() else {
        return false;
    };
    if !is_integer_type(&table.columns[*key].sql_type) {
        return false;
    }

    let key_set = BTreeSet::from([*key]);
    let covered = table
        .indices
        .iter()
        .any(|index| index.columns.iter().copied().collect::<BTreeSet<_>>() == key_set);
    if covered {
        return false;
    }

    table.indices.push(Index {
        name: IMPLICIT_ROWID_INDEX.to_string(),
        columns: vec![*key],
        unique: true,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_table_sql;
    use crate::sql::Dialect;

    fn table(sql: &str) -> Table {
        let mut ctx = BuildContext::new(Dialect::Sqlite);
        build_table_sql(&mut ctx, sql).unwrap();
        ctx.finish().tables.remove(0)
    }

    #[test]
    fn test_implicit_index_on_integer_key() {
        let mut t = table("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL)");
        assert!(add_implicit_index(&mut t));
        assert_eq!(
            t.indices,
            vec![Index {
                name: IMPLICIT_ROWID_INDEX.to_string(),
                columns: vec![0],
                unique: true,
            }]
        );
        assert!(!add_implicit_index(&mut t));
        assert_eq!(t.indices.len(), 1);
    }

    #[test]
    fn test_no_implicit_index_for_other_keys() {
        let cases = [
            "CREATE TABLE t (code TEXT PRIMARY KEY)",
            "CREATE TABLE t (a INTEGER, b INTEGER, PRIMARY KEY (a, b))",
            "CREATE TABLE t (a INTEGER)",
        ];
        for sql in cases {
            let mut t = table(sql);
            assert!(!add_implicit_index(&mut t), "{sql}");
            assert!(t.indices.is_empty());
        }
    }

    #[test]
    fn test_existing_index_covers_key() {
        let mut t = table("CREATE TABLE t (id BIGINT PRIMARY KEY, name TEXT)");
        let explicit = build_index(&t, "t_id", &["id".to_string()], false).unwrap();
        t.indices.push(explicit);
        assert!(!add_implicit_index(&mut t));
        assert_eq!(t.indices.len(), 1);
    }

    #[test]
    fn test_index_members_in_order() {
        let t = table("CREATE TABLE t (a INTEGER, b TEXT, c REAL)");
        let index = build_index(&t, "t_cb", &["c".to_string(), "B".to_string()], true).unwrap();
        assert_eq!(index.columns, vec![2, 1]);
        assert!(index.unique);
    }

    #[test]
    fn test_index_errors() {
        let t = table("CREATE TABLE t (a INTEGER)");
        assert!(matches!(
            build_index(&t, "empty", &[], false),
            Err(Error::MissingData(_))
        ));
        assert!(matches!(
            build_index(&t, "bad", &["z".to_string()], false),
            Err(Error::UnresolvedReference(_))
        ));
    }
}
