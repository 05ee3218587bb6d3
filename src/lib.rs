//! A small regex engine: a recursive-descent parser, a Thompson compiler to
//! bytecode, and a Pike VM finding the longest match at a given offset.
//!
//! ```
//! let mut re = pikeregex::compile("a|ab");
//! let m = re.find("abc").unwrap();
//! assert_eq!(m.as_str(), Some("ab"));
//! ```
//!
//! Several patterns can be combined into a single program that reports which
//! one matched:
//!
//! ```
//! let mut lexer = pikeregex::compile_tokenizer(&[("[a-z]+", 1), ("[0-9]+", 2)]);
//! assert_eq!(lexer.find("42").map(|m| m.token), Some(2));
//! ```

pub mod dump;
pub mod regex;
pub mod syntax;
pub mod thompson;
pub mod tokenizer;
pub mod utf8;
pub mod util;

pub use regex::{Builder, CompileError, Config, Regex};
pub use util::{Char, CharRange, Input, Match, Span};

/// Compiles `pattern` with the default configuration. Syntax errors are
/// recovered from, see [`Regex::diagnostics`].
pub fn compile(pattern: &str) -> Regex {
    Regex::new(pattern)
}

/// Compiles one program matching any of the `(pattern, token id)` pairs.
pub fn compile_tokenizer(definitions: &[(&str, u32)]) -> Regex {
    Regex::tokenizer(definitions)
}
