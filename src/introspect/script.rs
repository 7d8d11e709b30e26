//! Offline source reading a DDL script.

use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use super::{IndexInfo, IntrospectionSource, SchemaObject};
use crate::error::{Error, Result};
use crate::sql::ast::{ColumnConstraint, CreateTable, Ident, Statement, TableElement};
use crate::sql::{Dialect, parse_statement, split_statements};

#[derive(Debug, Clone)]
struct ScriptIndex {
    table: String,
    info: IndexInfo,
    columns: Vec<String>,
}

/// Serves tables, indices and views from `CREATE` statements.
///
/// Indices SQLite would create for `PRIMARY KEY` and `UNIQUE` constraints
/// are reported as `sqlite_autoindex_<table>_<n>`, the same as a live
/// database, so both sources yield the same schema.
#[derive(Debug, Clone, Default)]
pub struct ScriptSource {
    tables: Vec<SchemaObject>,
    views: Vec<SchemaObject>,
    indices: Vec<ScriptIndex>,
}

impl ScriptSource {
    pub fn parse(script: &str) -> Result<Self> {
        let mut source = Self::default();
        for sql in split_statements(script) {
            match parse_statement(sql)? {
                Statement::CreateTable(create) => {
                    source.indices.extend(auto_indices(&create));
                    source.tables.push(SchemaObject::new(create.name.name, sql));
                }
                Statement::CreateIndex(create) => {
                    source.indices.push(ScriptIndex {
                        table: create.table.name,
                        info: IndexInfo {
                            name: create.name.name,
                            unique: create.unique,
                        },
                        columns: create.columns.into_iter().map(|c| c.name).collect(),
                    });
                }
                Statement::CreateView(create) => {
                    source.views.push(SchemaObject::new(create.name.name, sql));
                }
                Statement::Select(_) | Statement::Other => {
                    trace!(statement = sql, "ignoring statement");
                }
            }
        }
        debug!(
            tables = source.tables.len(),
            indices = source.indices.len(),
            views = source.views.len(),
            "parsed script"
        );
        Ok(source)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let script = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&script)
    }
}

impl IntrospectionSource for ScriptSource {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn tables(&self) -> Result<Vec<SchemaObject>> {
        Ok(self.tables.clone())
    }

    fn indices(&self, table: &str) -> Result<Vec<IndexInfo>> {
        Ok(self
            .indices
            .iter()
            .filter(|index| index.table.eq_ignore_ascii_case(table))
            .map(|index| index.info.clone())
            .collect())
    }

    fn index_columns(&self, index: &str) -> Result<Vec<String>> {
        self.indices
            .iter()
            .find(|i| i.info.name == index)
            .map(|i| i.columns.clone())
            .ok_or_else(|| Error::MissingData(format!("index {index} not in script")))
    }

    fn views(&self) -> Result<Vec<SchemaObject>> {
        Ok(self.views.clone())
    }
}

/// Indices SQLite creates on its own for a table's key constraints,
/// numbered in creation order. A constraint over the same columns as an
/// earlier one reuses that index.
fn auto_indices(create: &CreateTable) -> Vec<ScriptIndex> {
    let table = &create.name.name;
    let rowid_alias = rowid_alias(create);

    let mut keys: Vec<Vec<String>> = Vec::new();
    for element in &create.elements {
        match element {
            TableElement::Column(def) => {
                for constraint in &def.constraints {
                    let is_key = match constraint {
                        ColumnConstraint::PrimaryKey => rowid_alias.as_ref() != Some(&def.name),
                        ColumnConstraint::Unique => true,
                        _ => false,
                    };
                    if is_key {
                        keys.push(vec![def.name.name.clone()]);
                    }
                }
            }
            TableElement::PrimaryKey(columns) => {
                let aliased = match (&rowid_alias, columns.as_slice()) {
                    (Some(alias), [only]) => alias.name.eq_ignore_ascii_case(&only.name),
                    _ => false,
                };
                if !aliased {
                    keys.push(names(columns));
                }
            }
            TableElement::Unique(columns) => keys.push(names(columns)),
            TableElement::ForeignKey { .. } | TableElement::Check(_) => {}
        }
    }
    // Without a rowid the integer key is indexed once the table is complete.
    if create.without_rowid {
        if let Some(alias) = rowid_alias {
            keys.push(vec![alias.name]);
        }
    }

    let mut created: Vec<Vec<String>> = Vec::new();
    for key in keys {
        if !created.contains(&key) {
            created.push(key);
        }
    }
    created
        .into_iter()
        .enumerate()
        .map(|(n, columns)| ScriptIndex {
            table: table.clone(),
            info: IndexInfo {
                name: format!("sqlite_autoindex_{table}_{}", n + 1),
                unique: true,
            },
            columns,
        })
        .collect()
}

/// The single primary-key column declared exactly `INTEGER`, which SQLite
/// stores as the rowid rather than in a separate index.
fn rowid_alias(create: &CreateTable) -> Option<Ident> {
    let mut key: Vec<&Ident> = Vec::new();
    for element in &create.elements {
        match element {
            TableElement::Column(def)
                if def.constraints.contains(&ColumnConstraint::PrimaryKey) =>
            {
                key.push(&def.name)
            }
            TableElement::PrimaryKey(columns) => key.extend(columns),
            _ => {}
        }
    }
    let [only] = key.as_slice() else {
        return None;
    };
    create.elements.iter().find_map(|element| match element {
        TableElement::Column(def)
            if def.name.name.eq_ignore_ascii_case(&only.name)
                && def
                    .sql_type
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case("INTEGER")) =>
        {
            Some(def.name.clone())
        }
        _ => None,
    })
}

fn names(columns: &[Ident]) -> Vec<String> {
    columns.iter().map(|c| c.name.clone()).collect()
}
