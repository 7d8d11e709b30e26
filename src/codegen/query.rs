//! Query template compilation.
//!
//! A template is SQL with typed placeholders, e.g.
//! `SELECT a, b FROM t WHERE a = {x int}`. Compiling replaces every
//! placeholder with `?`, records its name and type, and maps the result
//! columns back to fields of the table or view being queried.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use crate::error::{Error, Result, ResultExt};
use crate::schema::{Query, Schema, Table, View, names};
use crate::sql::ast::SelectItem;
use crate::sql::parse_select;
use crate::sql::types::ColumnType;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^\s]+)\s+([^\}]+)\}").expect("placeholder pattern is valid")
});

/// A field of a generated type, as seen by queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Column name used in SQL.
    pub name: String,
    /// `name` rendered for a statement, quoted when needed.
    pub sql: String,
    pub field_name: String,
    pub ty: ColumnType,
}

/// The table or view a query reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub type_name: String,
    /// Table or view name rendered for a statement.
    pub sql: String,
    pub fields: Vec<Field>,
}

impl Target {
    pub fn from_table(table: &Table) -> Self {
        Self {
            type_name: table.type_name.clone(),
            sql: table.ident.to_sql(),
            fields: table
                .columns
                .iter()
                .map(|c| Field {
                    name: c.ident.name.clone(),
                    sql: c.ident.to_sql(),
                    field_name: c.field_name.clone(),
                    ty: c.ty,
                })
                .collect(),
        }
    }

    pub fn from_view(schema: &Schema, view: &View) -> Self {
        Self {
            type_name: view.type_name.clone(),
            sql: view.ident.to_sql(),
            fields: view
                .columns
                .iter()
                .map(|c| {
                    let column = schema.column(c.column);
                    let sql = match &c.alias {
                        Some(alias) => alias.to_sql(),
                        None => column.ident.to_sql(),
                    };
                    Field {
                        name: c.sql_name.clone(),
                        sql,
                        field_name: c.field_name.clone(),
                        ty: column.ty,
                    }
                })
                .collect(),
        }
    }

    /// Case-insensitive, as SQLite matches column names.
    pub fn find_field(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Every field, comma separated, for a projection.
    pub fn column_list(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.sql.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: ColumnType,
}

impl Parameter {
    /// Rust identifier of the generated argument.
    pub fn ident(&self) -> String {
        names::rust_ident(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub name: String,
    /// Statement with positional `?` markers.
    pub sql: String,
    /// Placeholders in occurrence order; a repeated name appears each time.
    pub params: Vec<Parameter>,
    /// Target field index of each result column, in projection order.
    pub columns: Vec<usize>,
    pub one: bool,
}

impl CompiledQuery {
    /// Distinct parameters in first-occurrence order, as the generated
    /// method takes them.
    pub fn arguments(&self) -> Vec<&Parameter> {
        let mut seen: Vec<&Parameter> = Vec::new();
        for param in &self.params {
            if !seen.iter().any(|p| p.name == param.name) {
                seen.push(param);
            }
        }
        seen
    }

    /// Name of the generated SQL constant, e.g. `BY_ID`.
    pub fn const_name(&self) -> String {
        self.name.to_uppercase()
    }
}

/// Replace `{name type}` placeholders with `?`, collecting parameters.
pub fn replace_placeholders(sql: &str) -> Result<(String, Vec<Parameter>)> {
    let mut params = Vec::new();
    let mut failure = None;
    let compiled = PLACEHOLDER.replace_all(sql, |caps: &Captures<'_>| {
        match placeholder(&caps[1], &caps[2], &params) {
            Ok(param) => params.push(param),
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
        "?"
    });
    if let Some(e) = failure {
        return Err(e);
    }
    Ok((compiled.into_owned(), params))
}

fn placeholder(name: &str, ty: &str, seen: &[Parameter]) -> Result<Parameter> {
    if !is_identifier(name) {
        return Err(Error::Structural(format!(
            "query parameter name `{name}` is not an identifier"
        )));
    }
    let ty = ty
        .parse::<ColumnType>()
        .map_err(|()| Error::InvalidParameterType {
            name: name.to_string(),
            ty: ty.trim().to_string(),
        })?;
    if let Some(earlier) = seen.iter().find(|p| p.name == name && p.ty != ty) {
        return Err(Error::Structural(format!(
            "query parameter {name} declared as both {} and {ty}",
            earlier.ty
        )));
    }
    Ok(Parameter {
        name: name.to_string(),
        ty,
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Map a compiled statement's projection back to target fields.
pub fn result_columns(sql: &str, target: &Target) -> Result<Vec<usize>> {
    let select = parse_select(sql)?;
    let mut columns = Vec::new();
    for item in &select.items {
        let item = match item {
            SelectItem::Aliased { item, .. } => item.as_ref(),
            other => other,
        };
        match item {
            SelectItem::Wildcard => columns.extend(0..target.fields.len()),
            SelectItem::Column(expr) => {
                let index = target.find_field(&expr.column.name).ok_or_else(|| {
                    Error::UnresolvedReference(format!(
                        "{} has no column {}",
                        target.type_name, expr.column
                    ))
                })?;
                columns.push(index);
            }
            SelectItem::Expression(text) => {
                return Err(Error::Structural(format!(
                    "cannot map result expression `{text}` to a field"
                )));
            }
            SelectItem::Aliased { .. } => {
                return Err(Error::Structural("nested alias in projection".to_string()));
            }
        }
    }
    Ok(columns)
}

pub fn compile_query(target: &Target, query: &Query) -> Result<CompiledQuery> {
    let compiled = compile(target, query).within("query", query.name.as_str())?;
    trace!(
        query = %compiled.name,
        params = compiled.params.len(),
        columns = compiled.columns.len(),
        "compiled query"
    );
    Ok(compiled)
}

fn compile(target: &Target, query: &Query) -> Result<CompiledQuery> {
    let (sql, params) = replace_placeholders(&query.sql)?;
    let columns = result_columns(&sql, target)?;
    Ok(CompiledQuery {
        name: query.name.clone(),
        sql,
        params,
        columns,
        one: query.one,
    })
}

fn lookup_condition(field: &Field) -> String {
    let name = names::unraw(&field.field_name);
    // `IS` also matches NULL against a NULL argument.
    let op = if field.ty.nullable { "IS" } else { "=" };
    format!("{} {op} {{{name} {}}}", field.sql, field.ty)
}

/// `by_<index columns>` for every index plus `get` over all rows.
/// When two indices give the same name the first one wins.
pub fn table_queries(table: &Table) -> Vec<Query> {
    let target = Target::from_table(table);
    let select = format!("SELECT {} FROM {}", target.column_list(), target.sql);

    let mut queries: Vec<Query> = Vec::new();
    for index in &table.indices {
        let fields: Vec<&Field> = index.columns.iter().map(|&i| &target.fields[i]).collect();
        let name = format!(
            "by_{}",
            fields
                .iter()
                .map(|f| names::unraw(&f.field_name))
                .collect::<Vec<_>>()
                .join("_")
        );
        if queries.iter().any(|q| q.name == name) {
            continue;
        }
        let condition = fields
            .iter()
            .map(|f| lookup_condition(f))
            .collect::<Vec<_>>()
            .join(" AND ");
        queries.push(Query::new(
            name,
            format!("{select} WHERE {condition}"),
            index.unique,
        ));
    }
    queries.push(Query::new("get", select, false));
    queries
}

/// A multi-row `by_<field>` lookup per projected column plus `get`.
/// Field names are unique within a view, so every column gets one.
pub fn view_queries(schema: &Schema, view: &View) -> Vec<Query> {
    let target = Target::from_view(schema, view);
    let select = format!("SELECT {} FROM {}", target.column_list(), target.sql);

    let mut queries: Vec<Query> = Vec::new();
    for field in &target.fields {
        let name = format!("by_{}", names::unraw(&field.field_name));
        queries.push(Query::new(
            name,
            format!("{select} WHERE {}", lookup_condition(field)),
            false,
        ));
    }
    queries.push(Query::new("get", select, false));
    queries
}
