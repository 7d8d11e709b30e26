//! SQL front end: lexer, parser, syntax tree and type mapping.

pub mod ast;
mod dialect;
mod lexer;
mod parser;
pub mod types;

pub use dialect::Dialect;
pub use lexer::split_statements;
pub use parser::{SqlParseError, parse_select, parse_statement};
