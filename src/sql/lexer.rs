//! SQL lexer for tokenizing DDL and SELECT statements.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Table,
    View,
    Index,
    Primary,
    Key,
    Foreign,
    References,
    Not,
    Null,
    Unique,
    Default,
    On,
    Delete,
    Update,
    Cascade,
    Restrict,
    Constraint,
    If,
    Exists,
    AutoIncrement,
    Check,
    Collate,
    Generated,
    As,
    Select,
    From,
    Where,
    Without,
    Asc,
    Desc,

    // Identifiers and literals
    Ident(String),
    QuotedIdent(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    Star,
    Param,
    Op(String),

    // End of input
    Eof,
}

impl Token {
    /// Canonical spelling of a keyword token.
    pub fn keyword(&self) -> Option<&'static str> {
        let kw = match self {
            Token::Create => "CREATE",
            Token::Table => "TABLE",
            Token::View => "VIEW",
            Token::Index => "INDEX",
            Token::Primary => "PRIMARY",
            Token::Key => "KEY",
            Token::Foreign => "FOREIGN",
            Token::References => "REFERENCES",
            Token::Not => "NOT",
            Token::Null => "NULL",
            Token::Unique => "UNIQUE",
            Token::Default => "DEFAULT",
            Token::On => "ON",
            Token::Delete => "DELETE",
            Token::Update => "UPDATE",
            Token::Cascade => "CASCADE",
            Token::Restrict => "RESTRICT",
            Token::Constraint => "CONSTRAINT",
            Token::If => "IF",
            Token::Exists => "EXISTS",
            Token::AutoIncrement => "AUTOINCREMENT",
            Token::Check => "CHECK",
            Token::Collate => "COLLATE",
            Token::Generated => "GENERATED",
            Token::As => "AS",
            Token::Select => "SELECT",
            Token::From => "FROM",
            Token::Where => "WHERE",
            Token::Without => "WITHOUT",
            Token::Asc => "ASC",
            Token::Desc => "DESC",
            _ => return None,
        };
        Some(kw)
    }

    /// True for a bare identifier spelled `word`, ignoring case.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Ident(s) if s.eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kw) = self.keyword() {
            return f.write_str(kw);
        }
        match self {
            Token::Ident(s) | Token::Num(s) | Token::Op(s) => f.write_str(s),
            Token::QuotedIdent(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            Token::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Dot => f.write_str("."),
            Token::Star => f.write_str("*"),
            Token::Param => f.write_str("?"),
            Token::Eof => f.write_str("end of input"),
            _ => Ok(()),
        }
    }
}

/// SQL lexer.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    current: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.char_indices().peekable();
        let current = chars.next();
        Self {
            input,
            chars,
            current,
        }
    }

    /// Byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.current.map_or(self.input.len(), |(i, _)| i)
    }

    fn current_char(&self) -> Option<char> {
        self.current.map(|(_, c)| c)
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.current_char() {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // skip *
        while let Some(c) = self.current_char() {
            self.advance();
            if c == '*' && self.current_char() == Some('/') {
                self.advance();
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Read a delimited run; a doubled closing delimiter is an escaped one.
    fn read_delimited(&mut self, close: char) -> String {
        self.advance(); // skip opening delimiter
        let mut s = String::new();
        while let Some(c) = self.current_char() {
            if c == close {
                if self.peek() == Some(close) {
                    s.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // skip closing delimiter
                    break;
                }
            } else {
                s.push(c);
                self.advance();
            }
        }
        s
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        let mut has_dot = false;

        if self.current_char() == Some('-') {
            num.push('-');
            self.advance();
        }

        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() {
                num.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num.push(c);
                self.advance();
            } else if matches!(c, 'e' | 'E')
                && self
                    .peek()
                    .is_some_and(|p| p.is_ascii_digit() || p == '-' || p == '+')
            {
                num.push(c);
                self.advance();
                if let Some(sign @ ('-' | '+')) = self.current_char() {
                    num.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }
        num
    }

    fn keyword_or_ident(&self, s: String) -> Token {
        match s.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "TABLE" => Token::Table,
            "VIEW" => Token::View,
            "INDEX" => Token::Index,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "FOREIGN" => Token::Foreign,
            "REFERENCES" => Token::References,
            "NOT" => Token::Not,
            "NULL" => Token::Null,
            "UNIQUE" => Token::Unique,
            "DEFAULT" => Token::Default,
            "ON" => Token::On,
            "DELETE" => Token::Delete,
            "UPDATE" => Token::Update,
            "CASCADE" => Token::Cascade,
            "RESTRICT" => Token::Restrict,
            "CONSTRAINT" => Token::Constraint,
            "IF" => Token::If,
            "EXISTS" => Token::Exists,
            "AUTOINCREMENT" | "AUTO_INCREMENT" => Token::AutoIncrement,
            "CHECK" => Token::Check,
            "COLLATE" => Token::Collate,
            "GENERATED" => Token::Generated,
            "AS" => Token::As,
            "SELECT" => Token::Select,
            "FROM" => Token::From,
            "WHERE" => Token::Where,
            "WITHOUT" => Token::Without,
            "ASC" => Token::Asc,
            "DESC" => Token::Desc,
            _ => Token::Ident(s),
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            match (self.current_char(), self.peek()) {
                (Some('-'), Some('-')) => self.skip_line_comment(),
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.skip_block_comment();
                }
                _ => break,
            }
        }
    }

    /// Next token together with the byte offset it starts at.
    pub fn next_token_with_offset(&mut self) -> (usize, Token) {
        self.skip_trivia();
        let offset = self.offset();
        (offset, self.next_token())
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            match self.current_char() {
                None => return Token::Eof,

                Some('-') if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                    return Token::Num(self.read_number());
                }

                Some('(') => {
                    self.advance();
                    return Token::LParen;
                }
                Some(')') => {
                    self.advance();
                    return Token::RParen;
                }
                Some(',') => {
                    self.advance();
                    return Token::Comma;
                }
                Some(';') => {
                    self.advance();
                    return Token::Semicolon;
                }
                Some('.') => {
                    if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        return Token::Num(self.read_number());
                    }
                    self.advance();
                    return Token::Dot;
                }
                Some('*') => {
                    self.advance();
                    return Token::Star;
                }
                Some('?') => {
                    self.advance();
                    // Numbered parameters (?1) are still a single marker.
                    while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                        self.advance();
                    }
                    return Token::Param;
                }

                Some('"') => return Token::QuotedIdent(self.read_delimited('"')),
                Some('`') => return Token::QuotedIdent(self.read_delimited('`')),
                Some('[') => return Token::QuotedIdent(self.read_delimited(']')),
                Some('\'') => return Token::Str(self.read_delimited('\'')),

                Some(c) if c.is_ascii_digit() => {
                    return Token::Num(self.read_number());
                }

                Some(c) if c.is_alphabetic() || c == '_' => {
                    let ident = self.read_identifier();
                    return self.keyword_or_ident(ident);
                }

                Some(c) if is_operator_char(c) => {
                    let mut op = String::new();
                    while let Some(c) = self.current_char().filter(|&c| is_operator_char(c)) {
                        op.push(c);
                        self.advance();
                    }
                    return Token::Op(op);
                }

                Some(_) => {
                    self.advance();
                    continue;
                }
            }
        }
    }

    /// Collect all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        tokens
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '<' | '>' | '!' | '+' | '-' | '/' | '%' | '|' | '&' | '~' | '^')
}

/// Split a script into statements at top-level semicolons.
///
/// Semicolons inside strings, quoted identifiers and comments do not split.
/// Leading comments are not part of a statement.
pub fn split_statements(script: &str) -> Vec<&str> {
    let mut lexer = Lexer::new(script);
    let mut statements = Vec::new();
    let mut start: Option<usize> = None;

    loop {
        let (offset, token) = lexer.next_token_with_offset();
        match token {
            Token::Eof => break,
            Token::Semicolon => {
                if let Some(start) = start.take() {
                    statements.push(script[start..offset].trim());
                }
            }
            _ => {
                start.get_or_insert(offset);
            }
        }
    }

    if let Some(start) = start {
        statements.push(script[start..].trim());
    }
    statements
}
