pub mod build;
pub mod codegen;
pub mod error;
pub mod introspect;
pub mod schema;
pub mod sql;

use wasm_bindgen::prelude::*;

use codegen::{GenerateOptions, GeneratedFile};
use introspect::ScriptSource;

pub use error::{Error, Result};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Run the whole pipeline on a DDL script.
pub fn generate_from_script(script: &str, options: &GenerateOptions) -> Result<Vec<GeneratedFile>> {
    let source = ScriptSource::parse(script)?;
    let schema = build::build_schema(&source)?;
    codegen::generate(&schema, options)
}

/// Generated files for `ddl` as (path, contents) pairs, mounted under
/// `package` or the default package name.
fn generate_file_map(ddl: &str, package: Option<String>) -> Result<Vec<(String, String)>> {
    let mut options = GenerateOptions::default();
    if let Some(package) = package {
        options.package = package;
    }
    let files = generate_from_script(ddl, &options)?;
    Ok(files
        .into_iter()
        .map(|file| (file.path.to_string_lossy().into_owned(), file.contents))
        .collect())
}

/// Generate data-access modules from DDL, as an object mapping file
/// names to contents
#[wasm_bindgen(js_name = "generateModels")]
pub fn generate_models(
    ddl: &str,
    package: Option<String>,
) -> std::result::Result<js_sys::Object, String> {
    let files = generate_file_map(ddl, package).map_err(|e| e.to_string())?;

    let out = js_sys::Object::new();
    for (path, contents) in files {
        js_sys::Reflect::set(&out, &JsValue::from(path), &JsValue::from(contents))
            .map_err(|_| "failed to build result object".to_string())?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DDL: &str = "CREATE TABLE users (id INTEGER PRIMARY KEY, born DATE);";

    #[test]
    fn test_file_map_uses_package() {
        let files = generate_file_map(DDL, None).unwrap();
        let paths: Vec<&str> = files.iter().map(|(path, _)| path.as_str()).collect();
        assert_eq!(paths, ["converters.rs", "utils.rs", "user.rs", "mod.rs"]);
        assert!(files[2].1.contains("use crate::models::converters::"));

        let files = generate_file_map(DDL, Some("db".to_string())).unwrap();
        assert!(files[2].1.contains("use crate::db::converters::"));
    }

    #[test]
    fn test_file_map_reports_errors() {
        let err = generate_file_map("CREATE TABLE log (line TEXT);", None).unwrap_err();
        assert!(err.to_string().starts_with("In table log: Unsupported structure:"));
    }
}
