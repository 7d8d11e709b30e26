//! Schema resolution: turns introspected DDL into a [`Schema`].
//!
//! Building is strictly sequential. Tables are built in the order the
//! source reports them and each is appended to the [`BuildContext`] before
//! the next starts, so a foreign key can only reach a table defined
//! earlier. Forward and self references fail as unresolved; there is no
//! cycle detection. Indices are resolved once every table exists, and views
//! last.

mod column;
mod index;
mod reference;
mod table;
mod view;

pub use column::build_column;
pub use index::{IMPLICIT_ROWID_INDEX, add_implicit_index, build_index, build_indices};
pub use reference::{resolve_column, resolve_reference};
pub use table::build_table;
pub use view::build_view;

use tracing::debug;

use crate::error::{Error, Result, ResultExt};
use crate::introspect::IntrospectionSource;
use crate::schema::{Schema, Table, TableId, View};
use crate::sql::ast::Statement;
use crate::sql::{Dialect, parse_statement};

/// In-progress schema threaded through every build step.
#[derive(Debug)]
pub struct BuildContext {
    schema: Schema,
}

impl BuildContext {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            schema: Schema::new(dialect),
        }
    }

    /// Everything built so far.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn push_table(&mut self, table: Table) -> Result<TableId> {
        if self.schema.find_table(&table.ident).is_some() {
            return Err(Error::Structural(format!("table {} defined twice", table.ident)));
        }
        self.schema.tables.push(table);
        Ok(TableId(self.schema.tables.len() - 1))
    }

    pub fn push_view(&mut self, view: View) -> Result<()> {
        if self.schema.find_view(&view.ident).is_some() {
            return Err(Error::Structural(format!("view {} defined twice", view.ident)));
        }
        self.schema.views.push(view);
        Ok(())
    }

    fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.schema.tables.iter_mut()
    }

    pub fn finish(self) -> Schema {
        self.schema
    }
}

/// Parse a `CREATE TABLE` statement, build it and append it.
pub fn build_table_sql(ctx: &mut BuildContext, sql: &str) -> Result<TableId> {
    let create = match parse_statement(sql)? {
        Statement::CreateTable(create) => create,
        _ => return Err(Error::Structural(format!("not a CREATE TABLE statement: {sql}"))),
    };
    let table = build_table(ctx, &create).within("table", create.name.name.as_str())?;
    ctx.push_table(table)
}

/// Parse a `CREATE VIEW` statement, build it and append it.
pub fn build_view_sql(ctx: &mut BuildContext, sql: &str) -> Result<()> {
    let create = match parse_statement(sql)? {
        Statement::CreateView(create) => create,
        _ => return Err(Error::Structural(format!("not a CREATE VIEW statement: {sql}"))),
    };
    let view = build_view(ctx, &create).within("view", create.name.name.as_str())?;
    ctx.push_view(view)
}

/// Build the complete schema a source describes.
pub fn build_schema(source: &dyn IntrospectionSource) -> Result<Schema> {
    let dialect = source.dialect();
    let mut ctx = BuildContext::new(dialect);

    for object in source.tables()? {
        if dialect.is_internal_table(&object.name) {
            debug!(table = %object.name, "skipping internal table");
            continue;
        }
        build_table_sql(&mut ctx, &object.sql)
            .map_err(|e| e.ensure_within("table", &object.name))?;
    }

    build_indices(&mut ctx, source)?;

    for object in source.views()? {
        build_view_sql(&mut ctx, &object.sql).map_err(|e| e.ensure_within("view", &object.name))?;
    }

    let schema = ctx.finish();
    debug!(
        tables = schema.tables.len(),
        views = schema.views.len(),
        "schema built"
    );
    Ok(schema)
}
