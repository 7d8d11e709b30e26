//! Code generation: one Rust module per table and view, plus the shared
//! support units and a `mod.rs` tying them together.

mod accessor;
pub mod query;
mod support;
mod table;
mod view;
mod writer;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::schema::{Query, Schema};

pub use query::{CompiledQuery, Target, compile_query, replace_placeholders};
pub use support::{converters_file, utils_file};
pub use table::{delete_sql, generate_table};
pub use view::generate_view;
pub use writer::{GeneratedFile, Writer, write_files};

/// Module names the package reserves for itself.
const RESERVED_MODULES: &[&str] = &["converters", "utils", "mod"];

/// Query names that would collide with generated items.
const RESERVED_QUERIES: &[&str] = &[
    "new", "from_row", "insert", "delete", "table", "columns", "view",
];

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Name of the package module the output is mounted as.
    pub package: String,
    /// Tables and views to leave out, by SQL name.
    pub exclude: Vec<String>,
    /// Extra queries keyed by table or view name.
    pub queries: BTreeMap<String, Vec<Query>>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            package: "models".to_string(),
            exclude: Vec::new(),
            queries: BTreeMap::new(),
        }
    }
}

impl GenerateOptions {
    fn excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|e| e == name)
    }
}

/// Standard queries followed by custom ones; the first query with a
/// given name wins.
fn merge_queries(owner: &str, mut standard: Vec<Query>, custom: &[Query]) -> Result<Vec<Query>> {
    for query in custom {
        if RESERVED_QUERIES.contains(&query.name.as_str()) {
            return Err(Error::Structural(format!(
                "query name {} is reserved",
                query.name
            ))
            .within("query", query.name.as_str()));
        }
        if standard.iter().any(|q| q.name == query.name) {
            warn!(owner, query = %query.name, "duplicate query name, keeping the first");
            continue;
        }
        standard.push(query.clone());
    }
    Ok(standard)
}

fn compile_all(target: &Target, queries: &[Query]) -> Result<Vec<CompiledQuery>> {
    queries.iter().map(|q| compile_query(target, q)).collect()
}

/// Render the whole package for `schema`.
pub fn generate(schema: &Schema, options: &GenerateOptions) -> Result<Vec<GeneratedFile>> {
    for owner in options.queries.keys() {
        if schema.table_named(owner).is_none() && schema.view_named(owner).is_none() {
            return Err(Error::UnresolvedReference(format!(
                "queries given for unknown table or view {owner}"
            )));
        }
    }

    let mut modules: BTreeSet<&str> = RESERVED_MODULES.iter().copied().collect();

    let mut files = vec![converters_file(), utils_file()];
    let mut exports: Vec<(&str, &str)> = Vec::new();
    let no_queries: Vec<Query> = Vec::new();

    for table in &schema.tables {
        let name = table.ident.name.as_str();
        if options.excluded(name) {
            debug!(table = name, "excluded");
            continue;
        }
        claim(&mut modules, name, &table.module_name)?;
        let custom = options.queries.get(name).unwrap_or(&no_queries);
        let queries = merge_queries(name, query::table_queries(table), custom)
            .map_err(|e| e.within("table", name))?;
        let target = Target::from_table(table);
        let compiled = compile_all(&target, &queries).map_err(|e| e.within("table", name))?;
        let file = generate_table(table, &compiled, &options.package)
            .map_err(|e| e.ensure_within("table", name))?;
        debug!(path = %file.path.display(), "generated");
        files.push(file);
        exports.push((table.module_name.as_str(), table.type_name.as_str()));
    }

    for view in &schema.views {
        let name = view.ident.name.as_str();
        if options.excluded(name) {
            debug!(view = name, "excluded");
            continue;
        }
        claim(&mut modules, name, &view.module_name)?;
        let custom = options.queries.get(name).unwrap_or(&no_queries);
        let queries = merge_queries(name, query::view_queries(schema, view), custom)
            .map_err(|e| e.within("view", name))?;
        let target = Target::from_view(schema, view);
        let compiled = compile_all(&target, &queries).map_err(|e| e.within("view", name))?;
        let file = generate_view(schema, view, &compiled, &options.package);
        debug!(path = %file.path.display(), "generated");
        files.push(file);
        exports.push((view.module_name.as_str(), view.type_name.as_str()));
    }

    files.push(package_file(&exports));
    Ok(files)
}

fn claim<'a>(modules: &mut BTreeSet<&'a str>, name: &str, module: &'a str) -> Result<()> {
    if !modules.insert(module) {
        return Err(Error::Structural(format!(
            "{name} maps to module {module}, which is already taken"
        )));
    }
    Ok(())
}

fn package_file(exports: &[(&str, &str)]) -> GeneratedFile {
    let mut w = Writer::new();
    w.line("//! Generated by tablegen; do not edit.");
    w.blank();
    w.line("pub mod converters;");
    w.line("pub mod utils;");
    for (module, _) in exports {
        w.line(format!("pub mod {module};"));
    }
    w.blank();
    for (module, type_name) in exports {
        w.line(format!("pub use {module}::{type_name};"));
    }
    w.line("pub use utils::{DatabaseError, Numeric, Slot};");
    GeneratedFile::new("mod.rs", w.finish())
}
