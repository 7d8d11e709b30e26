//! Resolved schema model.
//!
//! Built once by [`crate::build`], then read-only. Cross-table links are
//! [`ColumnRef`] indices into [`Schema::tables`]; no column owns another.

pub mod names;

use crate::sql::Dialect;
use crate::sql::ast::Ident;
use crate::sql::types::{ColumnType, Conversion};

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub dialect: Dialect,
    pub tables: Vec<Table>,
    pub views: Vec<View>,
}

/// Position of a table in [`Schema::tables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub usize);

/// Identity of one column: its table and its position in that table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
    pub table: TableId,
    pub column: usize,
}

impl Schema {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: Vec::new(),
            views: Vec::new(),
        }
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id.0]
    }

    pub fn column(&self, column: ColumnRef) -> &Column {
        &self.table(column.table).columns[column.column]
    }

    pub fn find_table(&self, ident: &Ident) -> Option<TableId> {
        self.tables
            .iter()
            .position(|t| &t.ident == ident)
            .map(TableId)
    }

    pub fn find_view(&self, ident: &Ident) -> Option<&View> {
        self.views.iter().find(|v| &v.ident == ident)
    }

    /// Look up a table by SQL name, quoted or not.
    pub fn table_named(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.ident.name == name)
    }

    pub fn view_named(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.ident.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub ident: Ident,
    /// Singular PascalCase name of the generated struct.
    pub type_name: String,
    /// Name of the generated module file.
    pub module_name: String,
    pub columns: Vec<Column>,
    pub indices: Vec<Index>,
    pub without_rowid: bool,
}

impl Table {
    pub fn new(ident: Ident) -> Self {
        Self {
            type_name: names::type_name(&ident.name),
            module_name: names::module_name(&ident.name),
            ident,
            columns: Vec::new(),
            indices: Vec::new(),
            without_rowid: false,
        }
    }

    pub fn find_column(&self, ident: &Ident) -> Option<usize> {
        self.columns.iter().position(|c| &c.ident == ident)
    }

    /// Case-insensitive lookup ignoring quoting, as SQLite resolves names.
    pub fn find_column_by_name(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.ident.name.eq_ignore_ascii_case(name))
    }

    pub fn find_index(&self, name: &str) -> Option<&Index> {
        self.indices.iter().find(|i| i.name == name)
    }

    /// Primary-key column positions in declaration order.
    pub fn primary_key(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    None,
    Str(String),
    Int(i64),
    Float(f64),
    /// Evaluated by the database, e.g. `CURRENT_TIMESTAMP`.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub ident: Ident,
    pub field_name: String,
    /// Declared SQL type, as written.
    pub sql_type: String,
    pub ty: ColumnType,
    pub default: DefaultValue,
    pub primary_key: bool,
    pub references: Option<ColumnRef>,
}

impl Column {
    pub fn nullable(&self) -> bool {
        self.ty.nullable
    }

    pub fn conversion(&self) -> Option<Conversion> {
        self.ty.conversion()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    /// Member column positions in the owning table, in index order.
    pub columns: Vec<usize>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub ident: Ident,
    pub type_name: String,
    pub module_name: String,
    pub columns: Vec<ViewColumn>,
}

impl View {
    pub fn new(ident: Ident) -> Self {
        Self {
            type_name: names::type_name(&ident.name),
            module_name: names::module_name(&ident.name),
            ident,
            columns: Vec::new(),
        }
    }

    pub fn find_column_by_name(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.sql_name.eq_ignore_ascii_case(name))
    }
}

/// One projected column of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewColumn {
    pub column: ColumnRef,
    pub alias: Option<Ident>,
    /// Name the view exposes: the alias when present, else the column name.
    pub sql_name: String,
    pub field_name: String,
}

impl ViewColumn {
    pub fn table(&self) -> TableId {
        self.column.table
    }
}

/// A named query attached to a table or view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    /// Statement with `{name type}` placeholders.
    pub sql: String,
    /// Fetch at most one row instead of iterating.
    pub one: bool,
}

impl Query {
    pub fn new(name: impl Into<String>, sql: impl Into<String>, one: bool) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
            one,
        }
    }
}
