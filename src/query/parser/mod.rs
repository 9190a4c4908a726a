//! Hand-written HQL lexer and recursive-descent parser.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use error::{ParseError, ParseErrorKind};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Position, Token, TokenKind};
