//! Token definitions for the HQL parser
//!
//! This module defines the lexical tokens used by the parser.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::Eof {
            write!(f, "<end of input>")
        } else {
            write!(f, "{}", self.lexeme)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Select,
    From,
    Where,
    Update,
    Delete,
    Insert,
    Set,
    As,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Group,
    By,
    Having,
    Order,
    Asc,
    Desc,
    And,
    Or,
    Not,
    Between,
    In,
    Like,
    Is,
    Null,
    Exists,
    Distinct,
    True,
    False,

    // Literals and identifiers
    Ident,
    IntLiteral,
    FloatLiteral,
    StringLiteral,

    // Parameters
    NamedParam,
    PositionalParam,

    // Punctuation and operators
    Comma,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,

    Eof,
}

impl TokenKind {
    /// Maps a case-insensitive keyword to its token kind.
    pub fn from_keyword(word: &str) -> Option<TokenKind> {
        let kind = match word.to_ascii_lowercase().as_str() {
            "select" => TokenKind::Select,
            "from" => TokenKind::From,
            "where" => TokenKind::Where,
            "update" => TokenKind::Update,
            "delete" => TokenKind::Delete,
            "insert" => TokenKind::Insert,
            "set" => TokenKind::Set,
            "as" => TokenKind::As,
            "join" => TokenKind::Join,
            "inner" => TokenKind::Inner,
            "left" => TokenKind::Left,
            "right" => TokenKind::Right,
            "full" => TokenKind::Full,
            "outer" => TokenKind::Outer,
            "group" => TokenKind::Group,
            "by" => TokenKind::By,
            "having" => TokenKind::Having,
            "order" => TokenKind::Order,
            "asc" => TokenKind::Asc,
            "desc" => TokenKind::Desc,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "between" => TokenKind::Between,
            "in" => TokenKind::In,
            "like" => TokenKind::Like,
            "is" => TokenKind::Is,
            "null" => TokenKind::Null,
            "exists" => TokenKind::Exists,
            "distinct" => TokenKind::Distinct,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => return None,
        };
        Some(kind)
    }
}
