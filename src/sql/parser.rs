//! SQL parser for CREATE TABLE / INDEX / VIEW and SELECT statements.

use super::ast::{
    ColumnConstraint, ColumnDef, ColumnExpr, CreateIndex, CreateTable, CreateView, Ident, Literal,
    Reference, Select, SelectItem, Statement, TableElement, TableSource,
};
use super::lexer::{Lexer, Token};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlParseError {
    #[error("Unexpected token: {0}")]
    UnexpectedToken(Token),
    #[error("Expected {expected}, found {found}")]
    Expected { expected: &'static str, found: Token },
    #[error("Unexpected end of input")]
    UnexpectedEof,
}

/// Parse the first statement of `input`.
pub fn parse_statement(input: &str) -> Result<Statement, SqlParseError> {
    let tokens = Lexer::new(input).tokenize();
    Parser::new(tokens).parse_statement()
}

/// Parse a `SELECT` statement; trailing clauses after `FROM` are ignored.
pub fn parse_select(input: &str) -> Result<Select, SqlParseError> {
    let tokens = Lexer::new(input).tokenize();
    Parser::new(tokens).parse_select()
}

const JOIN_WORDS: &[&str] = &[
    "JOIN", "NATURAL", "LEFT", "RIGHT", "FULL", "OUTER", "INNER", "CROSS",
];
const CLAUSE_WORDS: &[&str] = &[
    "GROUP", "ORDER", "LIMIT", "HAVING", "WINDOW", "UNION", "EXCEPT", "INTERSECT", "USING",
];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.current().is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &'static str) -> SqlParseError {
        match self.current() {
            Token::Eof => SqlParseError::UnexpectedEof,
            found => SqlParseError::Expected {
                expected,
                found: found.clone(),
            },
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), SqlParseError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn parse_name(&mut self, expected: &'static str) -> Result<Ident, SqlParseError> {
        let ident = match self.current() {
            Token::Ident(name) => Ident::bare(name.clone()),
            Token::QuotedIdent(name) | Token::Str(name) => Ident::quoted(name.clone()),
            // Keywords SQLite also accepts as plain names.
            Token::Key
            | Token::View
            | Token::Cascade
            | Token::Restrict
            | Token::Asc
            | Token::Desc
            | Token::Without
            | Token::Generated => {
                let word = self.current().keyword().unwrap_or_default();
                Ident::bare(word.to_lowercase())
            }
            _ => return Err(self.unexpected(expected)),
        };
        self.advance();
        Ok(ident)
    }

    /// `name` or `schema.name`; the schema part is dropped.
    fn parse_qualified_name(&mut self, expected: &'static str) -> Result<Ident, SqlParseError> {
        let name = self.parse_name(expected)?;
        if self.eat(&Token::Dot) {
            return self.parse_name(expected);
        }
        Ok(name)
    }

    fn skip_if_not_exists(&mut self) {
        if self.current() == &Token::If {
            self.advance(); // IF
            self.eat(&Token::Not);
            self.eat(&Token::Exists);
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, SqlParseError> {
        match self.current() {
            Token::Create => {
                self.advance();
                let unique = self.eat(&Token::Unique);
                if !self.eat_word("TEMP") {
                    self.eat_word("TEMPORARY");
                }
                match self.current() {
                    Token::Table => {
                        self.advance();
                        Ok(Statement::CreateTable(self.parse_create_table()?))
                    }
                    Token::Index => {
                        self.advance();
                        Ok(Statement::CreateIndex(self.parse_create_index(unique)?))
                    }
                    Token::View => {
                        self.advance();
                        Ok(Statement::CreateView(self.parse_create_view()?))
                    }
                    // Triggers and virtual tables carry no schema we model.
                    _ => Ok(Statement::Other),
                }
            }
            Token::Select => Ok(Statement::Select(self.parse_select()?)),
            _ => Ok(Statement::Other),
        }
    }

    fn parse_create_table(&mut self) -> Result<CreateTable, SqlParseError> {
        self.skip_if_not_exists();
        let name = self.parse_qualified_name("table name")?;
        self.expect(Token::LParen, "'(' before column definitions")?;

        let mut elements = Vec::new();
        loop {
            elements.push(self.parse_table_element()?);
            match self.current() {
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }

        // Table options: WITHOUT ROWID, STRICT
        let mut without_rowid = false;
        loop {
            match self.current() {
                Token::Without => {
                    self.advance();
                    if !self.eat_word("ROWID") {
                        return Err(self.unexpected("ROWID"));
                    }
                    without_rowid = true;
                }
                Token::Ident(word) if word.eq_ignore_ascii_case("STRICT") => self.advance(),
                Token::Comma => self.advance(),
                Token::Semicolon | Token::Eof => break,
                _ => return Err(self.unexpected("table option")),
            }
        }

        Ok(CreateTable {
            name,
            elements,
            without_rowid,
        })
    }

    fn parse_table_element(&mut self) -> Result<TableElement, SqlParseError> {
        if self.eat(&Token::Constraint) {
            self.parse_name("constraint name")?;
        }

        match self.current() {
            Token::Primary => {
                self.advance();
                self.expect(Token::Key, "KEY")?;
                let columns = self.parse_indexed_columns()?;
                self.skip_conflict_clause();
                self.eat(&Token::AutoIncrement);
                Ok(TableElement::PrimaryKey(columns))
            }
            Token::Unique => {
                self.advance();
                let columns = self.parse_indexed_columns()?;
                self.skip_conflict_clause();
                Ok(TableElement::Unique(columns))
            }
            Token::Check => {
                self.advance();
                Ok(TableElement::Check(self.parse_parenthesized_text()?))
            }
            Token::Foreign => {
                self.advance();
                self.expect(Token::Key, "KEY")?;
                let columns = self.parse_column_list()?;
                self.expect(Token::References, "REFERENCES")?;
                let reference = self.parse_reference()?;
                Ok(TableElement::ForeignKey { columns, reference })
            }
            _ => Ok(TableElement::Column(self.parse_column()?)),
        }
    }

    fn parse_column(&mut self) -> Result<ColumnDef, SqlParseError> {
        let name = self.parse_name("column name")?;
        let sql_type = self.parse_type_name()?;

        let mut constraints = Vec::new();
        loop {
            match self.current() {
                Token::Comma | Token::RParen | Token::Eof => break,
                Token::Constraint => {
                    self.advance();
                    self.parse_name("constraint name")?;
                }
                Token::Primary => {
                    self.advance();
                    self.expect(Token::Key, "KEY")?;
                    if !self.eat(&Token::Asc) {
                        self.eat(&Token::Desc);
                    }
                    self.skip_conflict_clause();
                    constraints.push(ColumnConstraint::PrimaryKey);
                    if self.eat(&Token::AutoIncrement) {
                        constraints.push(ColumnConstraint::AutoIncrement);
                    }
                }
                Token::Not => {
                    self.advance();
                    self.expect(Token::Null, "NULL")?;
                    self.skip_conflict_clause();
                    constraints.push(ColumnConstraint::NotNull);
                }
                Token::Null => {
                    self.advance();
                    self.skip_conflict_clause();
                    constraints.push(ColumnConstraint::Null);
                }
                Token::Unique => {
                    self.advance();
                    self.skip_conflict_clause();
                    constraints.push(ColumnConstraint::Unique);
                }
                Token::Default => {
                    self.advance();
                    constraints.push(ColumnConstraint::Default(self.parse_default_value()?));
                }
                Token::References => {
                    self.advance();
                    constraints.push(ColumnConstraint::References(self.parse_reference()?));
                }
                Token::AutoIncrement => {
                    self.advance();
                    constraints.push(ColumnConstraint::AutoIncrement);
                }
                Token::Check => {
                    self.advance();
                    constraints.push(ColumnConstraint::Check(self.parse_parenthesized_text()?));
                }
                Token::Collate => {
                    self.advance();
                    constraints.push(ColumnConstraint::Collate(self.parse_name("collation")?));
                }
                Token::Generated | Token::As => {
                    if self.eat(&Token::Generated) {
                        self.eat_word("ALWAYS");
                    }
                    self.expect(Token::As, "AS")?;
                    let expr = self.parse_parenthesized_text()?;
                    if !self.eat_word("STORED") {
                        self.eat_word("VIRTUAL");
                    }
                    constraints.push(ColumnConstraint::Generated(expr));
                }
                _ => return Err(self.unexpected("column constraint")),
            }
        }

        Ok(ColumnDef {
            name,
            sql_type,
            constraints,
        })
    }

    /// Type words, e.g. `UNSIGNED BIG INT`; size arguments are skipped.
    fn parse_type_name(&mut self) -> Result<Option<String>, SqlParseError> {
        let mut words = Vec::new();
        while let Token::Ident(word) = self.current() {
            words.push(word.clone());
            self.advance();
        }
        if words.is_empty() {
            return Ok(None);
        }
        if self.current() == &Token::LParen {
            self.parse_parenthesized_text()?;
        }
        Ok(Some(words.join(" ")))
    }

    fn parse_default_value(&mut self) -> Result<Literal, SqlParseError> {
        let literal = match self.current().clone() {
            Token::Str(s) => Literal::Str(s),
            Token::Num(n) => number_literal(&n).ok_or_else(|| self.unexpected("number literal"))?,
            Token::Op(sign) if sign == "+" || sign == "-" => {
                self.advance();
                let Token::Num(n) = self.current().clone() else {
                    return Err(self.unexpected("number literal"));
                };
                let signed = if sign == "-" { format!("-{n}") } else { n };
                number_literal(&signed).ok_or_else(|| self.unexpected("number literal"))?
            }
            Token::Null => Literal::Null,
            Token::Ident(word) => Literal::Expression(word.to_uppercase()),
            Token::LParen => {
                let inner = self.parse_parenthesized_text()?;
                return Ok(Literal::Expression(format!("({inner})")));
            }
            _ => return Err(self.unexpected("default value")),
        };
        self.advance();
        Ok(literal)
    }

    fn parse_reference(&mut self) -> Result<Reference, SqlParseError> {
        let table = self.parse_qualified_name("referenced table")?;
        let columns = if self.current() == &Token::LParen {
            self.parse_column_list()?
        } else {
            Vec::new()
        };
        self.skip_reference_actions()?;
        Ok(Reference { table, columns })
    }

    /// `(a, b, c)` of plain column names.
    fn parse_column_list(&mut self) -> Result<Vec<Ident>, SqlParseError> {
        self.expect(Token::LParen, "'('")?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_name("column name")?);
            match self.current() {
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
        Ok(columns)
    }

    /// `(a COLLATE nocase DESC, b)`; expression members are rejected.
    fn parse_indexed_columns(&mut self) -> Result<Vec<Ident>, SqlParseError> {
        self.expect(Token::LParen, "'('")?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_name("indexed column")?);
            if self.eat(&Token::Collate) {
                self.parse_name("collation")?;
            }
            if !self.eat(&Token::Asc) {
                self.eat(&Token::Desc);
            }
            match self.current() {
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
        Ok(columns)
    }

    fn skip_conflict_clause(&mut self) {
        if self.current() == &Token::On && self.peek_at(1).is_word("CONFLICT") {
            self.advance(); // ON
            self.advance(); // CONFLICT
            self.advance(); // resolution
        }
    }

    fn skip_reference_actions(&mut self) -> Result<(), SqlParseError> {
        loop {
            match self.current() {
                Token::On => {
                    self.advance();
                    if !matches!(self.current(), Token::Delete | Token::Update) {
                        return Err(self.unexpected("DELETE or UPDATE"));
                    }
                    self.advance();
                    match self.current() {
                        Token::Cascade | Token::Restrict => self.advance(),
                        Token::Ident(s) if s.eq_ignore_ascii_case("SET") => {
                            self.advance();
                            if matches!(self.current(), Token::Null | Token::Default) {
                                self.advance();
                            }
                        }
                        Token::Ident(s) if s.eq_ignore_ascii_case("NO") => {
                            self.advance();
                            self.eat_word("ACTION");
                        }
                        _ => return Err(self.unexpected("foreign key action")),
                    }
                }
                Token::Ident(s) if s.eq_ignore_ascii_case("MATCH") => {
                    self.advance();
                    self.parse_name("match type")?;
                }
                Token::Not if self.peek_at(1).is_word("DEFERRABLE") => {
                    self.advance();
                    self.advance();
                    self.skip_initially();
                }
                Token::Ident(s) if s.eq_ignore_ascii_case("DEFERRABLE") => {
                    self.advance();
                    self.skip_initially();
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_initially(&mut self) {
        if self.eat_word("INITIALLY") && !self.eat_word("DEFERRED") {
            self.eat_word("IMMEDIATE");
        }
    }

    /// Consume `( ... )` and return the inner tokens as text.
    fn parse_parenthesized_text(&mut self) -> Result<String, SqlParseError> {
        self.expect(Token::LParen, "'('")?;
        let mut parts = Vec::new();
        let mut depth = 1;
        loop {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                }
                Token::Eof => return Err(SqlParseError::UnexpectedEof),
                _ => {}
            }
            parts.push(self.current().to_string());
            self.advance();
        }
        Ok(parts.join(" "))
    }

    fn parse_create_index(&mut self, unique: bool) -> Result<CreateIndex, SqlParseError> {
        self.skip_if_not_exists();
        let name = self.parse_qualified_name("index name")?;
        self.expect(Token::On, "ON")?;
        let table = self.parse_qualified_name("table name")?;
        let columns = self.parse_indexed_columns()?;
        // A partial index WHERE clause does not change the member columns.
        Ok(CreateIndex {
            name,
            table,
            columns,
            unique,
        })
    }

    fn parse_create_view(&mut self) -> Result<CreateView, SqlParseError> {
        self.skip_if_not_exists();
        let name = self.parse_qualified_name("view name")?;
        let columns = if self.current() == &Token::LParen {
            self.parse_column_list()?
        } else {
            Vec::new()
        };
        self.expect(Token::As, "AS")?;
        let query = self.parse_select()?;
        Ok(CreateView {
            name,
            columns,
            query,
        })
    }

    fn parse_select(&mut self) -> Result<Select, SqlParseError> {
        self.expect(Token::Select, "SELECT")?;
        if !self.eat_word("DISTINCT") {
            self.eat_word("ALL");
        }

        let mut items = Vec::new();
        loop {
            items.push(self.parse_select_item()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }

        let from = if self.eat(&Token::From) {
            self.parse_from()?
        } else {
            Vec::new()
        };

        Ok(Select { items, from })
    }

    fn parse_select_item(&mut self) -> Result<SelectItem, SqlParseError> {
        let item = if self.eat(&Token::Star) {
            SelectItem::Wildcard
        } else if let Some(column) = self.try_parse_column_expr() {
            SelectItem::Column(column)
        } else {
            SelectItem::Expression(self.collect_expression()?)
        };

        let alias = if self.eat(&Token::As) {
            Some(self.parse_name("alias")?)
        } else if matches!(
            self.current(),
            Token::Ident(_) | Token::QuotedIdent(_) | Token::Str(_)
        ) {
            Some(self.parse_name("alias")?)
        } else {
            None
        };

        Ok(match alias {
            Some(alias) => SelectItem::Aliased {
                item: Box::new(item),
                alias,
            },
            None => item,
        })
    }

    /// `column` or `table.column` followed by the end of the item.
    fn try_parse_column_expr(&mut self) -> Option<ColumnExpr> {
        let start = self.pos;
        let first = self.parse_name("column").ok()?;
        let column = if self.eat(&Token::Dot) {
            match self.parse_name("column") {
                Ok(column) => ColumnExpr {
                    table: Some(first),
                    column,
                },
                Err(_) => {
                    self.pos = start;
                    return None;
                }
            }
        } else {
            ColumnExpr {
                table: None,
                column: first,
            }
        };

        let ends_item = matches!(
            self.current(),
            Token::Comma
                | Token::From
                | Token::As
                | Token::Where
                | Token::Eof
                | Token::Semicolon
                | Token::Ident(_)
                | Token::QuotedIdent(_)
                | Token::Str(_)
        );
        if ends_item {
            Some(column)
        } else {
            self.pos = start;
            None
        }
    }

    fn collect_expression(&mut self) -> Result<String, SqlParseError> {
        let mut parts = Vec::new();
        let mut depth = 0usize;
        loop {
            match self.current() {
                Token::Eof | Token::Semicolon => break,
                Token::Comma | Token::From | Token::As | Token::Where if depth == 0 => break,
                Token::LParen => depth += 1,
                Token::RParen => {
                    if depth == 0 {
                        return Err(SqlParseError::UnexpectedToken(Token::RParen));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            parts.push(self.current().to_string());
            self.advance();
        }
        if parts.is_empty() {
            return Err(self.unexpected("select item"));
        }
        Ok(parts.join(" "))
    }

    fn parse_from(&mut self) -> Result<Vec<TableSource>, SqlParseError> {
        let mut sources = Vec::new();
        loop {
            let table = self.parse_qualified_name("table name")?;
            let alias = if self.eat(&Token::As) {
                Some(self.parse_name("table alias")?)
            } else if self.at_alias() {
                Some(self.parse_name("table alias")?)
            } else {
                None
            };
            sources.push(TableSource { table, alias });

            if self.eat(&Token::On) {
                self.skip_join_constraint();
            } else if self.eat_word("USING") {
                self.parse_column_list()?;
            }

            if self.eat(&Token::Comma) || self.eat_join_operator()? {
                continue;
            }
            break;
        }
        Ok(sources)
    }

    fn at_alias(&self) -> bool {
        match self.current() {
            Token::QuotedIdent(_) => true,
            Token::Ident(word) => !JOIN_WORDS
                .iter()
                .chain(CLAUSE_WORDS)
                .any(|w| word.eq_ignore_ascii_case(w)),
            _ => false,
        }
    }

    fn at_join_word(&self) -> bool {
        JOIN_WORDS.iter().any(|w| self.current().is_word(w))
    }

    fn eat_join_operator(&mut self) -> Result<bool, SqlParseError> {
        if !self.at_join_word() {
            return Ok(false);
        }
        while self.at_join_word() {
            if self.eat_word("JOIN") {
                return Ok(true);
            }
            self.advance();
        }
        Err(self.unexpected("JOIN"))
    }

    fn skip_join_constraint(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current() {
                Token::Eof | Token::Semicolon => return,
                Token::LParen => depth += 1,
                Token::RParen if depth == 0 => return,
                Token::RParen => depth -= 1,
                Token::Comma | Token::Where if depth == 0 => return,
                _ if depth == 0 && (self.at_join_word() || self.at_clause_word()) => return,
                _ => {}
            }
            self.advance();
        }
    }

    fn at_clause_word(&self) -> bool {
        CLAUSE_WORDS.iter().any(|w| self.current().is_word(w))
    }
}

fn number_literal(text: &str) -> Option<Literal> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Literal::Int(i));
    }
    text.parse::<f64>().ok().map(Literal::Float)
}
