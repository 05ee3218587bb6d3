//! Recursive-descent parser with one code point of lookahead.
//!
//! ```text
//! alt        := concat ('|' concat)*
//! concat     := atom*
//! atom       := primary ('*' | '+' | '?')*
//! primary    := char | '.' | '^' | '$' | '(' alt ')' | '[' bracket ']' | '\' escape
//! ```

use super::{Ast, Parse, SyntaxError};
use crate::utf8;
use crate::util::{Char, CharRange};

const fn range(from: char, to: char) -> CharRange {
    CharRange {
        from: Char::new(from as u32),
        to: Char::new(to as u32),
    }
}

const WORD: [CharRange; 4] = [
    range('A', 'Z'),
    range('a', 'z'),
    range('0', '9'),
    range('_', '_'),
];

const DIGIT: [CharRange; 1] = [range('0', '9')];

const SPACE: [CharRange; 6] = [
    range(' ', ' '),
    range('\t', '\t'),
    range('\r', '\r'),
    range('\n', '\n'),
    range('\x0b', '\x0b'),
    range('\x0c', '\x0c'),
];

/// Characters that stand for themselves when escaped.
fn is_meta(b: u8) -> bool {
    matches!(
        b,
        b'.' | b'[' | b']' | b'\\' | b'(' | b')' | b'*' | b'+' | b'?' | b'{' | b'}' | b'|' | b'^' | b'$'
    )
}

pub struct Parser<'p> {
    pattern: &'p [u8],
    /// Byte offset right after `current`.
    pos: usize,
    /// Byte offset where `current` starts.
    offset: usize,
    /// Lookahead, `None` at the end of the pattern.
    current: Option<Char>,
    errors: Vec<SyntaxError>,
}

impl<'p> Parser<'p> {
    pub fn new(pattern: &'p [u8]) -> Self {
        let mut parser = Self {
            pattern,
            pos: 0,
            offset: 0,
            current: None,
            errors: Vec::new(),
        };
        parser.advance();
        parser
    }

    pub fn parse(mut self) -> Parse {
        let ast = self.alt();
        // `alt` only returns at the end of the pattern or at a `)` that
        // closes nothing.
        if self.current.is_some() {
            self.error(SyntaxError::UnmatchedParen {
                offset: self.offset,
            });
        }
        Parse {
            ast,
            errors: self.errors,
        }
    }

    fn error(&mut self, err: SyntaxError) {
        log::debug!("{err}");
        self.errors.push(err);
    }

    fn advance(&mut self) {
        self.offset = self.pos;
        if self.pos >= self.pattern.len() {
            self.current = None;
            return;
        }
        self.current = match utf8::decode(self.pattern, &mut self.pos) {
            Ok(c) => Some(c),
            Err(err) => {
                self.pos += 1;
                self.error(err.into());
                Some(Char::from(err.byte))
            }
        };
    }

    /// The lookahead if it's an ASCII character.
    fn peek_ascii(&self) -> Option<u8> {
        self.current
            .and_then(|c| u8::try_from(c.value()).ok())
            .filter(u8::is_ascii)
    }

    fn at(&self, b: u8) -> bool {
        self.peek_ascii() == Some(b)
    }

    fn alt(&mut self) -> Ast {
        let mut ast = self.concat();
        while self.at(b'|') {
            self.advance();
            ast = Ast::alternation(ast, self.concat());
        }
        ast
    }

    fn concat(&mut self) -> Ast {
        let mut ast = self.atom();
        while self.current.is_some() && !self.at(b'|') && !self.at(b')') {
            ast = Ast::concat(ast, self.atom());
        }
        ast
    }

    fn atom(&mut self) -> Ast {
        let offset = self.offset;
        let Some(c) = self.current else {
            return Ast::Empty;
        };

        let mut ast = match self.peek_ascii() {
            Some(b'|' | b')') => Ast::Empty,
            Some(b'(') => {
                self.advance();
                let ast = self.alt();
                if self.at(b')') {
                    self.advance();
                } else {
                    self.error(SyntaxError::UnterminatedGroup { offset });
                }
                ast
            }
            Some(b'[') => {
                self.advance();
                let ast = self.bracket();
                if self.at(b']') {
                    self.advance();
                } else {
                    self.error(SyntaxError::UnterminatedBracket { offset });
                }
                ast
            }
            Some(b'\\') => {
                self.advance();
                self.escape(offset)
            }
            Some(b'.') => self.sentinel(Char::ANY),
            Some(b'^') => self.sentinel(Char::START),
            Some(b'$') => self.sentinel(Char::END),
            _ => {
                self.advance();
                Ast::Literal(CharRange::single(c))
            }
        };

        loop {
            ast = match self.peek_ascii() {
                Some(b'*') => Ast::Star(Box::new(ast)),
                Some(b'+') => Ast::Plus(Box::new(ast)),
                Some(b'?') => Ast::Optional(Box::new(ast)),
                _ => break,
            };
            self.advance();
        }

        ast
    }

    fn sentinel(&mut self, c: Char) -> Ast {
        self.advance();
        Ast::Literal(CharRange::single(c))
    }

    /// Parses the body of a bracket class, the opening `[` already consumed.
    /// Stops before the closing `]`.
    fn bracket(&mut self) -> Ast {
        let negated = self.at(b'^');
        if negated {
            self.advance();
        }

        let mut ranges = Vec::new();

        // The first member is always literal, this is what makes `[]a]` and
        // `[-a]` work.
        let Some(first) = self.current else {
            return Ast::class(ranges, negated);
        };
        self.advance();
        ranges.push(CharRange::single(first));

        let mut last_is_range = false;

        while let Some(c) = self.current {
            if self.at(b']') {
                break;
            }
            let offset = self.offset;
            self.advance();
            match self.current {
                Some(hi) if c == Char::from(b'-') && !self.at(b']') && !last_is_range => {
                    self.advance();
                    last_is_range = true;
                    if let Some(lo) = ranges.pop() {
                        if lo.from <= hi {
                            ranges.push(CharRange::new(lo.from, hi));
                        } else {
                            self.error(SyntaxError::InvalidRange { offset });
                        }
                    }
                }
                _ => {
                    ranges.push(CharRange::single(c));
                    last_is_range = false;
                }
            }
        }

        Ast::class(ranges, negated)
    }

    /// Parses what follows a backslash. `offset` is the backslash position.
    fn escape(&mut self, offset: usize) -> Ast {
        let Some(c) = self.current else {
            self.error(SyntaxError::TrailingBackslash { offset });
            return Ast::Empty;
        };
        let b = self.peek_ascii();
        self.advance();

        let control = |c: char| Ast::Literal(CharRange::single(c));

        match b {
            Some(b'a') => control('\x07'),
            Some(b'b') => control('\x08'),
            Some(b'e') => control('\x1b'),
            Some(b'f') => control('\x0c'),
            Some(b'n') => control('\n'),
            Some(b'r') => control('\r'),
            Some(b't') => control('\t'),
            Some(b'v') => control('\x0b'),
            Some(b @ (b'w' | b'W')) => Ast::class(WORD, b == b'W'),
            Some(b @ (b'd' | b'D')) => Ast::class(DIGIT, b == b'D'),
            Some(b @ (b's' | b'S')) => Ast::class(SPACE, b == b'S'),
            Some(b'm') => self.token(offset),
            Some(b) if is_meta(b) => Ast::Literal(CharRange::single(c)),
            _ => {
                self.error(SyntaxError::UnknownEscape { offset, escape: c });
                Ast::Empty
            }
        }
    }

    /// Parses the decimal id of a `\m` token marker. No digits means id 0.
    fn token(&mut self, offset: usize) -> Ast {
        let mut id = Some(0u32);
        while let Some(d @ b'0'..=b'9') = self.peek_ascii() {
            id = id
                .and_then(|id| id.checked_mul(10))
                .and_then(|id| id.checked_add((d - b'0') as u32));
            self.advance();
        }
        match id {
            Some(id) => Ast::Token(id),
            None => {
                self.error(SyntaxError::TokenOutOfRange { offset });
                Ast::Empty
            }
        }
    }
}
