//! Generated identifier naming.

use heck::{ToPascalCase, ToSnakeCase};

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const RESERVED_PATHS: &[&str] = &["crate", "self", "super", "Self"];

/// Singular PascalCase type name: `order_lines` -> `OrderLine`.
pub fn type_name(sql_name: &str) -> String {
    let name = singular_snake(sql_name).to_pascal_case();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{name}")
    } else if RESERVED_PATHS.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

/// Singular snake_case module name: `OrderLines` -> `order_line`.
///
/// Module names double as file names, so keywords get a trailing
/// underscore instead of the raw prefix.
pub fn module_name(sql_name: &str) -> String {
    let name = singular_snake(sql_name);
    if RUST_KEYWORDS.contains(&name.as_str()) || RESERVED_PATHS.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        rust_ident(&name)
    }
}

/// snake_case field or method name, escaped when it is a keyword.
pub fn field_name(sql_name: &str) -> String {
    rust_ident(&sql_name.to_snake_case())
}

/// `name` as a usable Rust identifier.
pub fn rust_ident(name: &str) -> String {
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else if RESERVED_PATHS.contains(&name) {
        format!("{name}_")
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Identifier without its raw prefix, for composing longer names.
pub fn unraw(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

fn singular_snake(sql_name: &str) -> String {
    let snake = sql_name.to_snake_case();
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{head}_{}", singularize(last)),
        None => singularize(&snake),
    }
}

/// English singular of a lowercase word, covering regular plurals.
pub fn singularize(word: &str) -> String {
    const UNCHANGED: &[&str] = &["news", "series", "species", "data", "status"];
    const IRREGULAR: &[(&str, &str)] = &[
        ("people", "person"),
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("indices", "index"),
        ("matrices", "matrix"),
        ("vertices", "vertex"),
        ("analyses", "analysis"),
    ];

    if UNCHANGED.contains(&word) {
        return word.to_string();
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return singular.to_string();
    }

    let strip = |suffix: &str, replacement: &str| {
        word.strip_suffix(suffix)
            .filter(|stem| stem.len() > 1)
            .map(|stem| format!("{stem}{replacement}"))
    };

    strip("ies", "y")
        .or_else(|| strip("sses", "ss"))
        .or_else(|| strip("shes", "sh"))
        .or_else(|| strip("ches", "ch"))
        .or_else(|| strip("xes", "x"))
        .or_else(|| strip("zzes", "zz"))
        .or_else(|| {
            let keeps_s = ["ss", "us", "is", "os"].iter().any(|s| word.ends_with(s));
            if keeps_s { None } else { strip("s", "") }
        })
        .unwrap_or_else(|| word.to_string())
}
