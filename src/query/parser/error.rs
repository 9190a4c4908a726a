//! Error handling for the HQL parser
//!
//! This module defines error types for the parsing process,
//! providing unified error reporting with position information
//! and hints.

use std::error::Error;
use std::fmt;

use super::token::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    LexicalError,
    SyntaxError,
    UnexpectedToken,
    UnterminatedString,
    InvalidNumber,
    InvalidCharacter,
    UnexpectedEndOfInput,
    UnsupportedStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub position: Position,
    pub unexpected_token: Option<String>,
    pub expected_tokens: Vec<String>,
    pub hints: Vec<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: String, position: Position) -> Self {
        ParseError {
            kind,
            message,
            position,
            unexpected_token: None,
            expected_tokens: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn syntax_error<T: fmt::Display>(msg: T, position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::SyntaxError,
            format!("Syntax error: {}", msg),
            position,
        )
    }

    pub fn unexpected_token<T: fmt::Display>(token: T, position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken,
            format!("Unexpected token: {}", token),
            position,
        )
        .with_unexpected_token(token)
    }

    pub fn unexpected_end_of_input(position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedEndOfInput,
            "Unexpected end of input".to_string(),
            position,
        )
    }

    pub fn unterminated_string(position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnterminatedString,
            "Unterminated string literal".to_string(),
            position,
        )
    }

    pub fn invalid_number(lexeme: &str, position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::InvalidNumber,
            format!("Invalid number: {}", lexeme),
            position,
        )
    }

    pub fn invalid_character(ch: char, position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::InvalidCharacter,
            format!("Unexpected character: '{}'", ch),
            position,
        )
    }

    pub fn unsupported_statement<T: fmt::Display>(msg: T, position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnsupportedStatement,
            msg.to_string(),
            position,
        )
    }

    pub fn with_unexpected_token<T: fmt::Display>(mut self, token: T) -> Self {
        self.unexpected_token = Some(token.to_string());
        self
    }

    pub fn with_expected_tokens(mut self, tokens: Vec<String>) -> Self {
        self.expected_tokens = tokens;
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.position.line, self.position.column, self.message
        )?;

        if !self.expected_tokens.is_empty() {
            write!(f, "\n  Expected one of: {}", self.expected_tokens.join(", "))?;
        }

        if !self.hints.is_empty() {
            write!(f, "\n  Hint(s):")?;
            for hint in &self.hints {
                write!(f, "\n    - {}", hint)?;
            }
        }

        Ok(())
    }
}

impl Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let error = ParseError::unexpected_token("ORDER", Position::new(10, 5));
        let display = error.to_string();
        assert!(display.contains("line 10, column 5"));
        assert!(display.contains("Unexpected token: ORDER"));
    }

    #[test]
    fn test_parse_error_with_expected_tokens() {
        let error = ParseError::unexpected_token(",", Position::new(1, 12))
            .with_expected_tokens(vec!["FROM".to_string(), "WHERE".to_string()]);
        let display = error.to_string();
        assert!(display.contains("Expected one of: FROM, WHERE"));
    }

    #[test]
    fn test_parse_error_with_hint() {
        let error = ParseError::syntax_error("invalid syntax", Position::new(5, 10))
            .with_hint("Queries must start with SELECT, UPDATE or DELETE");
        let display = error.to_string();
        assert!(display.contains("Hint"));
        assert!(display.contains("SELECT"));
    }
}
