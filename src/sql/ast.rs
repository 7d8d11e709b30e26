//! Syntax tree for the statements the analyser understands.
//!
//! Every expression kind is a closed enum; builders match on them
//! exhaustively, so a new kind cannot be silently ignored.

use std::fmt;

/// A SQL identifier and whether it was written quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub quoted: bool,
}

impl Ident {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: false,
        }
    }

    pub fn quoted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: true,
        }
    }

    /// Render for use inside a SQL statement.
    pub fn to_sql(&self) -> String {
        if self.quoted {
            format!("\"{}\"", self.name.replace('"', "\"\""))
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Literal in a `DEFAULT` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Null,
    /// Keyword or parenthesized expression, e.g. `CURRENT_TIMESTAMP`.
    Expression(String),
}

/// `REFERENCES table (columns)`; an empty column list means the parent key.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub table: Ident,
    pub columns: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    PrimaryKey,
    NotNull,
    Null,
    Default(Literal),
    References(Reference),
    AutoIncrement,
    Unique,
    Check(String),
    Collate(Ident),
    Generated(String),
}

impl ColumnConstraint {
    pub fn kind(&self) -> &'static str {
        match self {
            ColumnConstraint::PrimaryKey => "PRIMARY KEY",
            ColumnConstraint::NotNull => "NOT NULL",
            ColumnConstraint::Null => "NULL",
            ColumnConstraint::Default(_) => "DEFAULT",
            ColumnConstraint::References(_) => "REFERENCES",
            ColumnConstraint::AutoIncrement => "AUTOINCREMENT",
            ColumnConstraint::Unique => "UNIQUE",
            ColumnConstraint::Check(_) => "CHECK",
            ColumnConstraint::Collate(_) => "COLLATE",
            ColumnConstraint::Generated(_) => "GENERATED",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Ident,
    /// Declared type words without size arguments, e.g. `DOUBLE PRECISION`.
    pub sql_type: Option<String>,
    pub constraints: Vec<ColumnConstraint>,
}

/// One entry between the parentheses of `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq)]
pub enum TableElement {
    Column(ColumnDef),
    PrimaryKey(Vec<Ident>),
    ForeignKey {
        columns: Vec<Ident>,
        reference: Reference,
    },
    Unique(Vec<Ident>),
    Check(String),
}

impl TableElement {
    pub fn kind(&self) -> &'static str {
        match self {
            TableElement::Column(_) => "column definition",
            TableElement::PrimaryKey(_) => "PRIMARY KEY",
            TableElement::ForeignKey { .. } => "FOREIGN KEY",
            TableElement::Unique(_) => "UNIQUE",
            TableElement::Check(_) => "CHECK",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: Ident,
    pub elements: Vec<TableElement>,
    pub without_rowid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub name: Ident,
    pub table: Ident,
    pub columns: Vec<Ident>,
    pub unique: bool,
}

/// `column` or `table.column`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExpr {
    pub table: Option<Ident>,
    pub column: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Wildcard,
    Column(ColumnExpr),
    Aliased { item: Box<SelectItem>, alias: Ident },
    /// Anything else, kept as text for diagnostics.
    Expression(String),
}

impl SelectItem {
    pub fn kind(&self) -> &'static str {
        match self {
            SelectItem::Wildcard => "wildcard",
            SelectItem::Column(_) => "column",
            SelectItem::Aliased { .. } => "aliased item",
            SelectItem::Expression(_) => "expression",
        }
    }
}

/// A table in a `FROM` clause, with its optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSource {
    pub table: Ident,
    pub alias: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub items: Vec<SelectItem>,
    pub from: Vec<TableSource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateView {
    pub name: Ident,
    /// Optional `CREATE VIEW v (a, b)` column names.
    pub columns: Vec<Ident>,
    pub query: Select,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    CreateIndex(CreateIndex),
    CreateView(CreateView),
    Select(Select),
    Other,
}
