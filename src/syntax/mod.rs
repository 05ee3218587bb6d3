//! Pattern syntax: the [`Ast`] and the recursive-descent parser producing it.
//!
//! Parsing never fails. Malformed constructs are reported as [`SyntaxError`]s
//! and replaced with whatever could be salvaged (often [`Ast::Empty`]), so
//! the caller always gets a tree it can compile.

use thiserror::Error;

use crate::utf8::DecodeError;
use crate::util::Char;

mod ast;
mod parser;

pub use ast::Ast;
pub use parser::Parser;

/// A recoverable error found while parsing a pattern. Offsets are byte
/// offsets into the pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("trailing backslash at offset {offset}")]
    TrailingBackslash { offset: usize },

    #[error("unterminated group opened at offset {offset}")]
    UnterminatedGroup { offset: usize },

    #[error("unterminated brackets opened at offset {offset}")]
    UnterminatedBracket { offset: usize },

    #[error("unrecognized escape sequence `\\{escape}` at offset {offset}")]
    UnknownEscape { offset: usize, escape: Char },

    #[error("unmatched `)` at offset {offset}, the rest of the pattern is ignored")]
    UnmatchedParen { offset: usize },

    #[error("invalid range in brackets at offset {offset}, start is greater than end")]
    InvalidRange { offset: usize },

    #[error("token id at offset {offset} doesn't fit in 32 bits")]
    TokenOutOfRange { offset: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Result of parsing a pattern. The tree is always complete, errors are
/// recorded separately.
#[derive(Debug, Clone)]
pub struct Parse {
    pub ast: Ast,
    pub errors: Vec<SyntaxError>,
}

/// Parses `pattern` into an [`Ast`].
pub fn parse(pattern: &[u8]) -> Parse {
    Parser::new(pattern).parse()
}
