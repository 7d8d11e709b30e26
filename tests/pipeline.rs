use pretty_assertions::assert_eq;
use rusqlite::Connection;
use tablegen::build::{IMPLICIT_ROWID_INDEX, build_schema};
use tablegen::codegen::{
    GenerateOptions, Target, compile_query, delete_sql, generate, write_files,
};
use tablegen::introspect::{ScriptSource, SqliteSource};
use tablegen::schema::{Query, Schema};
use tablegen::{Error, generate_from_script};

const BLOG: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        joined DATETIME DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE posts (
        id INTEGER PRIMARY KEY,
        author INTEGER NOT NULL REFERENCES users (id),
        title TEXT NOT NULL,
        score REAL DEFAULT 0.5
    );
    CREATE INDEX posts_author ON posts (author);
    CREATE VIEW bylines AS SELECT p.title, u.email AS writer FROM posts p JOIN users u ON p.author = u.id;
";

fn script_schema(ddl: &str) -> Schema {
    build_schema(&ScriptSource::parse(ddl).unwrap()).unwrap()
}

fn live_schema(ddl: &str) -> Schema {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(ddl).unwrap();
    build_schema(&SqliteSource::from_connection(conn)).unwrap()
}

#[test]
fn implicit_index_and_standard_queries() {
    let schema = script_schema("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT);");
    let table = &schema.tables[0];

    assert_eq!(table.columns.len(), 2);
    assert_eq!(table.indices.len(), 1);
    assert_eq!(table.indices[0].name, IMPLICIT_ROWID_INDEX);
    assert_eq!(table.indices[0].columns, vec![0]);
    assert!(table.indices[0].unique);

    let files = generate(&schema, &GenerateOptions::default()).unwrap();
    let code = &files[2].contents;
    assert!(code.contains("pub const BY_ID: &str = \"SELECT id, name FROM t WHERE id IS ?\";"));
    assert!(code.contains("pub const GET: &str = \"SELECT id, name FROM t\";"));
}

#[test]
fn view_keeps_aliases_and_column_identity() {
    let schema = script_schema(BLOG);
    let view = &schema.views[0];

    assert_eq!(view.columns.len(), 2);
    assert_eq!(view.columns[0].alias, None);
    assert_eq!(view.columns[1].alias.as_ref().map(|a| a.name.as_str()), Some("writer"));
    assert_eq!(view.find_column_by_name("WRITER"), Some(1));
    assert_eq!(view.find_column_by_name("email"), None);

    let email = schema.column(view.columns[1].column);
    assert_eq!(email.ident.name, "email");
    assert_eq!(schema.table(view.columns[1].table()).ident.name, "users");
    assert_eq!(schema.table(view.columns[0].table()).ident.name, "posts");
}

#[test]
fn foreign_key_resolves_to_parent_column() {
    let schema = script_schema(BLOG);
    let posts = schema.table_named("posts").unwrap();
    let author = &posts.columns[1];
    let target = schema.column(author.references.unwrap());
    assert_eq!(target.ident.name, "id");
    assert_eq!(
        posts.indices.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
        ["posts_author", IMPLICIT_ROWID_INDEX]
    );
    assert!(!posts.find_index("posts_author").unwrap().unique);
}

#[test]
fn compiled_query_maps_projection() {
    let schema = script_schema(BLOG);
    let target = Target::from_table(schema.table_named("posts").unwrap());
    let query = Query::new("titles", "SELECT title, id FROM posts WHERE author = {who int}", false);
    let compiled = compile_query(&target, &query).unwrap();

    assert_eq!(compiled.sql, "SELECT title, id FROM posts WHERE author = ?");
    assert_eq!(compiled.columns, vec![2, 0]);
    assert_eq!(compiled.params.len(), 1);
    assert_eq!(compiled.params[0].name, "who");
}

#[test]
fn script_and_live_sources_agree() {
    assert_eq!(script_schema(BLOG), live_schema(BLOG));

    let composite = "
        CREATE TABLE tags (name TEXT PRIMARY KEY, label TEXT UNIQUE);
        CREATE TABLE links (a INTEGER, b INTEGER, note TEXT, PRIMARY KEY (a, b), UNIQUE (b, a));
        CREATE UNIQUE INDEX links_note ON links (note);
    ";
    assert_eq!(script_schema(composite), live_schema(composite));
}

#[test]
fn delete_statement_targets_primary_key() {
    let schema = script_schema(BLOG);
    let posts = schema.table_named("posts").unwrap();

    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(BLOG).unwrap();
    conn.execute_batch(
        "INSERT INTO users (email) VALUES ('a@example.com');
         INSERT INTO posts (author, title) VALUES (1, 'first'), (1, 'second');",
    )
    .unwrap();

    let sql = delete_sql(posts).unwrap();
    assert_eq!(sql, "DELETE FROM posts WHERE id IS ?");
    assert_eq!(conn.execute(&sql, [2]).unwrap(), 1);
    assert_eq!(conn.execute(&sql, [2]).unwrap(), 0);

    let left: i64 = conn
        .query_row("SELECT count(*) FROM posts", [], |row| row.get(0))
        .unwrap();
    assert_eq!(left, 1);
}

#[test]
fn keyless_table_cannot_be_generated() {
    let err = generate_from_script("CREATE TABLE log (line TEXT);", &GenerateOptions::default())
        .unwrap_err();
    assert!(matches!(err.root(), Error::Structural(_)));
}

#[test]
fn forward_reference_is_unresolved() {
    let source = ScriptSource::parse(
        "CREATE TABLE posts (id INTEGER PRIMARY KEY, author INTEGER REFERENCES users (id));
         CREATE TABLE users (id INTEGER PRIMARY KEY);",
    )
    .unwrap();
    let err = build_schema(&source).unwrap_err();
    assert!(matches!(err.root(), Error::UnresolvedReference(_)));
}

#[test]
fn writes_package_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let options = GenerateOptions {
        package: "db".to_string(),
        ..Default::default()
    };
    let files = generate_from_script(BLOG, &options).unwrap();
    write_files(dir.path(), &files).unwrap();

    let mut written: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(
        written,
        ["byline.rs", "converters.rs", "mod.rs", "post.rs", "user.rs", "utils.rs"]
    );

    let user = std::fs::read_to_string(dir.path().join("user.rs")).unwrap();
    assert!(user.contains(
        "use crate::db::converters::{optional_datetime_from_sql, optional_datetime_to_sql};"
    ));
    assert!(user.contains("pub fn by_email(conn: &Connection, email: String)"));
    let package = std::fs::read_to_string(dir.path().join("mod.rs")).unwrap();
    assert!(package.contains("pub use byline::Byline;"));
}
