//! Types and API for Regex matching
//!
//! This module defines the [`Regex`] struct, which bundles a compiled
//! [`PikeVM`] with the scratch [`State`] it runs on, and the [`Builder`] used
//! to configure compilation.

use thiserror::Error;

use crate::syntax::SyntaxError;
use crate::thompson::bytecode::Bytecode;
use crate::thompson::pike_vm::{PikeVM, State};
use crate::tokenizer;
use crate::util::{Input, Match};

/// Returned by [`Builder::build`] in strict mode when the pattern has syntax
/// errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "invalid pattern: {}",
    .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
)]
pub struct CompileError {
    pub errors: Vec<SyntaxError>,
}

/// A compiled pattern, ready to be matched.
///
/// Matching takes `&mut self` because the scratch buffers are reused from one
/// call to the next. To match from several threads, share the [`PikeVM`]
/// (see [`Regex::pike_vm`]) and give each thread its own
/// [`PikeVM::new_state`].
#[derive(Debug, Clone)]
pub struct Regex {
    vm: PikeVM,
    state: State,
    diagnostics: Vec<SyntaxError>,
}

impl Regex {
    /// Compiles `pattern` with the default configuration. This never fails,
    /// syntax errors are recovered from and kept in [`Regex::diagnostics`].
    pub fn new(pattern: &str) -> Self {
        Builder::new(pattern).compile()
    }

    /// Compiles one program matching any of `definitions`, given as
    /// `(pattern, token id)` pairs. The id of the matching pattern is
    /// reported in [`Match::token`].
    pub fn tokenizer(definitions: &[(&str, u32)]) -> Self {
        let pattern = tokenizer::combine(definitions);
        Builder::new(&pattern).compile()
    }

    /// Finds the longest match starting exactly at `input.start`.
    pub fn find<'s>(&mut self, input: impl Into<Input<'s>>) -> Option<Match<'s>> {
        self.vm.exec(input.into(), &mut self.state)
    }

    pub fn find_at<'s>(&mut self, subject: &'s [u8], start: usize) -> Option<Match<'s>> {
        self.find(Input::new(subject).start(start))
    }

    pub fn is_match<'s>(&mut self, input: impl Into<Input<'s>>) -> bool {
        self.vm.is_match(input.into(), &mut self.state)
    }

    /// Returns an iterator over consecutive matches, each one starting where
    /// the previous one ended. It stops at the first offset with no match or
    /// with an empty match.
    pub fn tokenize<'r, 's>(&'r mut self, input: impl Into<Input<'s>>) -> Tokens<'r, 's> {
        Tokens {
            regex: self,
            input: input.into(),
            done: false,
        }
    }

    /// Syntax errors recovered from while compiling.
    pub fn diagnostics(&self) -> &[SyntaxError] {
        &self.diagnostics
    }

    pub fn pike_vm(&self) -> &PikeVM {
        &self.vm
    }

    pub fn bytecode(&self) -> &Bytecode {
        self.vm.bytecode()
    }

    pub fn pattern(&self) -> &[u8] {
        self.vm.bytecode().source()
    }

    /// Frees the program, its copy of the pattern and its scratch buffers.
    /// The regex can't be used afterwards:
    ///
    /// ```compile_fail
    /// let mut re = pikeregex::Regex::new("a");
    /// re.release();
    /// re.find("a");
    /// ```
    pub fn release(self) {
        log::trace!(
            "releasing program for {:?}",
            String::from_utf8_lossy(self.pattern())
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Turn syntax errors into a [`CompileError`] instead of recovering.
    pub strict: bool,
    /// Read malformed UTF-8 in the subject as raw bytes. When false, a match
    /// attempt running into malformed UTF-8 fails.
    pub lossy_utf8: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            lossy_utf8: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Builder<'p> {
    pattern: &'p [u8],
    config: Config,
}

impl<'p> Builder<'p> {
    pub fn new(pattern: &'p str) -> Self {
        Self::from_bytes(pattern.as_bytes())
    }

    /// Patterns are expected to be UTF-8. Malformed sequences are reported
    /// and read as raw bytes.
    pub fn from_bytes(pattern: &'p [u8]) -> Self {
        Self {
            pattern,
            config: Config::default(),
        }
    }

    pub fn strict(mut self, value: bool) -> Self {
        self.config.strict = value;
        self
    }

    pub fn lossy_utf8(mut self, value: bool) -> Self {
        self.config.lossy_utf8 = value;
        self
    }

    pub fn build(self) -> Result<Regex, CompileError> {
        let strict = self.config.strict;
        let regex = self.compile();
        if strict && !regex.diagnostics.is_empty() {
            return Err(CompileError {
                errors: regex.diagnostics,
            });
        }
        Ok(regex)
    }

    fn compile(self) -> Regex {
        let (vm, diagnostics) = PikeVM::new(self.pattern, self.config);
        let state = vm.new_state();
        Regex {
            vm,
            state,
            diagnostics,
        }
    }
}

/// Iterator returned by [`Regex::tokenize`].
pub struct Tokens<'r, 's> {
    regex: &'r mut Regex,
    input: Input<'s>,
    done: bool,
}

impl<'r, 's> Iterator for Tokens<'r, 's> {
    type Item = Match<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.regex.find(self.input.clone()) {
            Some(m) if !m.is_empty() => {
                self.input.start = m.end();
                Some(m)
            }
            _ => {
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::util::Span;

    #[test]
    fn default_compilation_recovers() {
        let mut re = Regex::new("a(b");
        assert_eq!(
            re.diagnostics(),
            &[SyntaxError::UnterminatedGroup { offset: 1 }]
        );
        assert_eq!(re.find("ab").map(|m| m.len()), Some(2));
    }

    #[test]
    fn strict_compilation_fails() {
        let err = Builder::new(r"a\q").strict(true).build().unwrap_err();
        assert_eq!(
            err.errors,
            vec![SyntaxError::UnknownEscape {
                offset: 1,
                escape: 'q'.into()
            }]
        );
        assert_eq!(
            err.to_string(),
            "invalid pattern: unrecognized escape sequence `\\q` at offset 1"
        );
        assert!(Builder::new("a|b").strict(true).build().is_ok());
    }

    #[test]
    fn find_at_offset() {
        let mut re = Regex::new("[0-9]+");
        let m = re.find_at(b"ab123c", 2).unwrap();
        assert_eq!((m.start(), m.end()), (2, 5));
        assert_eq!(m.as_str(), Some("123"));
        assert!(re.find_at(b"ab123c", 1).is_none());
        assert!(re.find_at(b"ab123c", 7).is_none());
    }

    #[test]
    fn lossy_utf8_config() {
        let mut lossy = Builder::new("a.").build().unwrap();
        assert!(lossy.is_match(b"a\x80"));
        let mut strict = Builder::new("a.").lossy_utf8(false).build().unwrap();
        assert!(!strict.is_match(b"a\x80"));
    }

    #[test]
    fn tokenize_words_and_numbers() {
        let mut re = Regex::tokenizer(&[("[a-z]+", 1), ("[0-9]+", 2), (" +", 3)]);
        let tokens: Vec<_> = re
            .tokenize("let x 42")
            .map(|m| (m.as_str().unwrap_or_default(), m.token))
            .collect();
        assert_eq!(
            tokens,
            vec![
                ("let", 1),
                (" ", 3),
                ("x", 1),
                (" ", 3),
                ("42", 2)
            ]
        );
    }

    #[test]
    fn tokenize_stops_at_unknown_input() {
        let mut re = Regex::tokenizer(&[("[a-z]+", 1)]);
        let tokens: Vec<_> = re.tokenize("ab!cd").map(|m| m.span).collect();
        assert_eq!(tokens, vec![Span::from(0..2)]);
    }

    #[test]
    fn tokenize_stops_at_empty_match() {
        let mut re = Regex::new("a*");
        assert_eq!(re.tokenize("aab").count(), 1);
        assert_eq!(re.tokenize("b").count(), 0);
    }

    #[test]
    fn accessors() {
        let re = Regex::new("ab");
        assert_eq!(re.pattern(), b"ab");
        assert_eq!(re.bytecode().len(), 3);
        assert_eq!(re.pike_vm().config(), &Config::default());
        re.release();
    }
}
