//! Lexer for HQL query strings
//!
//! Splits the input into a flat token stream. Keywords are recognized
//! case-insensitively; identifiers keep their original spelling. String
//! literals keep their surrounding quotes so they can be emitted into
//! generated SQL unchanged.

use std::iter::Peekable;

use super::error::ParseError;
use super::token::{Position, Token, TokenKind};

pub struct Lexer {
    chars: Peekable<std::vec::IntoIter<char>>,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect::<Vec<_>>().into_iter().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Consumes the input and produces the token stream, terminated by
    /// an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let position = self.current_position();
            let ch = match self.peek_char() {
                Some(&ch) => ch,
                None => break,
            };

            if ch.is_alphabetic() || ch == '_' {
                let word = self.read_identifier();
                let kind = TokenKind::from_keyword(&word).unwrap_or(TokenKind::Ident);
                tokens.push(self.token_at(kind, word, position));
            } else if ch.is_ascii_digit() {
                let (lexeme, kind) = self.read_number();
                tokens.push(self.token_at(kind, lexeme, position));
            } else if ch == '\'' {
                let lexeme = self.read_string(position)?;
                tokens.push(self.token_at(TokenKind::StringLiteral, lexeme, position));
            } else if ch == ':' {
                self.read_char();
                let name = self.read_identifier();
                if name.is_empty() {
                    return Err(ParseError::invalid_character(':', position)
                        .with_hint("Named parameters are written as :name"));
                }
                tokens.push(self.token_at(TokenKind::NamedParam, name, position));
            } else if ch == '?' {
                self.read_char();
                let mut digits = String::new();
                while let Some(&c) = self.peek_char() {
                    if c.is_ascii_digit() {
                        digits.push(c);
                        self.read_char();
                    } else {
                        break;
                    }
                }
                tokens.push(self.token_at(TokenKind::PositionalParam, digits, position));
            } else {
                let token = self.read_operator(position)?;
                tokens.push(token);
            }
        }

        tokens.push(Token::new(TokenKind::Eof, "", self.line, self.column));
        Ok(tokens)
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn token_at(&self, kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Token {
        Token::new(kind, lexeme, position.line, position.column)
    }

    fn peek_char(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Peeks one character past the current lookahead.
    fn peek_second_char(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.chars.next();
        match ch {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.read_char();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut word = String::new();
        while let Some(&ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
                self.read_char();
            } else {
                break;
            }
        }
        word
    }

    fn read_number(&mut self) -> (String, TokenKind) {
        let mut lexeme = String::new();
        let mut has_decimal = false;
        let mut has_exponent = false;

        while let Some(&ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                lexeme.push(ch);
                self.read_char();
            } else if ch == '.' && !has_decimal && !has_exponent {
                // Only part of the number when a digit follows, otherwise
                // the dot belongs to a property path.
                if self.peek_second_char().map_or(false, |c| c.is_ascii_digit()) {
                    has_decimal = true;
                    lexeme.push(ch);
                    self.read_char();
                } else {
                    break;
                }
            } else if (ch == 'e' || ch == 'E') && !has_exponent {
                if !self.exponent_follows() {
                    break;
                }
                has_exponent = true;
                lexeme.push(ch);
                self.read_char();
                if let Some(&sign) = self.peek_char() {
                    if sign == '+' || sign == '-' {
                        lexeme.push(sign);
                        self.read_char();
                    }
                }
            } else {
                break;
            }
        }

        let kind = if has_decimal || has_exponent {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        (lexeme, kind)
    }

    /// True when the character after an `e`/`E` continues an exponent,
    /// distinguishing `1e3` from `1 each` written without a space.
    fn exponent_follows(&self) -> bool {
        let mut ahead = self.chars.clone();
        ahead.next();
        match ahead.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('+') | Some('-') => ahead.next().map_or(false, |c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn read_string(&mut self, start: Position) -> Result<String, ParseError> {
        let mut lexeme = String::new();
        lexeme.push('\'');
        self.read_char();

        loop {
            match self.read_char() {
                Some('\'') => {
                    // A doubled quote is an escaped quote, anything else
                    // closes the literal.
                    if self.peek_char() == Some(&'\'') {
                        lexeme.push_str("''");
                        self.read_char();
                    } else {
                        lexeme.push('\'');
                        return Ok(lexeme);
                    }
                }
                Some(ch) => lexeme.push(ch),
                None => return Err(ParseError::unterminated_string(start)),
            }
        }
    }

    fn read_operator(&mut self, position: Position) -> Result<Token, ParseError> {
        let ch = match self.read_char() {
            Some(ch) => ch,
            None => return Err(ParseError::unexpected_end_of_input(position)),
        };

        let (kind, lexeme) = match ch {
            ',' => (TokenKind::Comma, ",".to_string()),
            '.' => (TokenKind::Dot, ".".to_string()),
            '(' => (TokenKind::LParen, "(".to_string()),
            ')' => (TokenKind::RParen, ")".to_string()),
            '[' => (TokenKind::LBracket, "[".to_string()),
            ']' => (TokenKind::RBracket, "]".to_string()),
            '+' => (TokenKind::Plus, "+".to_string()),
            '-' => (TokenKind::Minus, "-".to_string()),
            '*' => (TokenKind::Star, "*".to_string()),
            '/' => (TokenKind::Slash, "/".to_string()),
            '=' => (TokenKind::Eq, "=".to_string()),
            '<' => match self.peek_char() {
                Some(&'>') => {
                    self.read_char();
                    (TokenKind::Ne, "<>".to_string())
                }
                Some(&'=') => {
                    self.read_char();
                    (TokenKind::Le, "<=".to_string())
                }
                _ => (TokenKind::Lt, "<".to_string()),
            },
            '>' => match self.peek_char() {
                Some(&'=') => {
                    self.read_char();
                    (TokenKind::Ge, ">=".to_string())
                }
                _ => (TokenKind::Gt, ">".to_string()),
            },
            '!' => match self.peek_char() {
                Some(&'=') => {
                    self.read_char();
                    (TokenKind::Ne, "!=".to_string())
                }
                _ => return Err(ParseError::invalid_character('!', position)),
            },
            other => return Err(ParseError::invalid_character(other, position)),
        };

        Ok(self.token_at(kind, lexeme, position))
    }
}
