//! Command-line entry point: introspect a schema and write the generated
//! modules to a directory.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tablegen::build::build_schema;
use tablegen::codegen::{GenerateOptions, generate, write_files};
use tablegen::introspect::{IntrospectionSource, ScriptSource};
use tablegen::sql::Dialect;
use tablegen::{Error, Result};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "tablegen",
    about = "Generate typed SQLite data-access modules from a database schema"
)]
struct Cli {
    /// Schema location: sqlite://path/to/db or ddl://path/to/schema.sql
    uri: String,

    /// Directory the package is written to
    outdir: PathBuf,

    /// Module name the generated package is mounted as
    #[arg(short, long, default_value = "models")]
    package: String,

    /// Table or view to leave out (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_source(uri: &str) -> Result<Box<dyn IntrospectionSource>> {
    let (scheme, path) = uri
        .split_once("://")
        .ok_or_else(|| Error::Structural(format!("`{uri}` is not of the form scheme://path")))?;

    let unsupported = || Error::Structural(format!("unsupported scheme `{scheme}`"));
    let dialect = Dialect::from_scheme(scheme).ok_or_else(unsupported)?;
    info!(%dialect, path, "opening schema source");

    match scheme.to_ascii_lowercase().as_str() {
        "ddl" => Ok(Box::new(ScriptSource::from_file(path)?)),
        #[cfg(not(target_arch = "wasm32"))]
        _ => Ok(Box::new(tablegen::introspect::SqliteSource::open(path)?)),
        #[cfg(target_arch = "wasm32")]
        _ => Err(unsupported()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let source = open_source(&cli.uri)?;
    let schema = build_schema(source.as_ref())?;
    info!(
        tables = schema.tables.len(),
        views = schema.views.len(),
        "schema resolved"
    );

    let options = GenerateOptions {
        package: cli.package,
        exclude: cli.exclude,
        ..Default::default()
    };
    let files = generate(&schema, &options)?;
    write_files(&cli.outdir, &files)?;
    info!(files = files.len(), outdir = %cli.outdir.display(), "done");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
