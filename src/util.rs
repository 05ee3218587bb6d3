/*!
This modules contains the types shared by the parser, the compiler and the
virtual machine: code points, character ranges, and the input and output of a
match attempt.
*/

use std::{fmt, ops::Range};

use crate::utf8;

/// A code point, or one of the sentinels standing for `.`, `^` and `$`.
///
/// Sentinels live right above [`Char::MAX`] so they never collide with a
/// real code point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Char(u32);

impl Char {
    /// Highest valid code point.
    pub const MAX: Char = Char(0x10ffff);
    /// Matches any code point (`.`).
    pub const ANY: Char = Char(0x110000);
    /// Start of input (`^`).
    pub const START: Char = Char(0x110001);
    /// End of input (`$`).
    pub const END: Char = Char(0x110002);

    pub const fn new(value: u32) -> Self {
        Char(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub fn is_sentinel(self) -> bool {
        self > Self::MAX
    }
}

impl From<char> for Char {
    fn from(value: char) -> Self {
        Char(value as u32)
    }
}

impl From<u8> for Char {
    fn from(value: u8) -> Self {
        Char(value as u32)
    }
}

impl fmt::Display for Char {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            return match *self {
                Char::ANY => write!(f, "/any/"),
                Char::START => write!(f, "/^/"),
                Char::END => write!(f, "/$/"),
                _ => write!(f, "{:#x}", self.0),
            };
        }
        if self.0 <= 0x7f && !(self.0 as u8).is_ascii_graphic() {
            return write!(f, "{:#x}", self.0);
        }
        let mut buf = [0; 4];
        match std::str::from_utf8(utf8::encode(*self, &mut buf)) {
            Ok(s) => f.write_str(s),
            // Surrogates encode fine but aren't valid UTF-8 text.
            Err(_) => write!(f, "{:#x}", self.0),
        }
    }
}

/// A single code point or an inclusive range of code points.
///
/// A single code point is stored as a range with `from == to`. A range
/// always satisfies `from <= to`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CharRange {
    pub from: Char,
    pub to: Char,
}

impl CharRange {
    pub fn single(c: impl Into<Char>) -> Self {
        let c = c.into();
        Self { from: c, to: c }
    }

    pub fn new(from: impl Into<Char>, to: impl Into<Char>) -> Self {
        let (from, to) = (from.into(), to.into());
        debug_assert!(from <= to);
        Self { from, to }
    }

    pub fn is_single(&self) -> bool {
        self.from == self.to
    }

    /// Returns true if `c` matches. The [`Char::ANY`] sentinel matches
    /// everything.
    #[inline]
    pub fn matches(&self, c: Char) -> bool {
        self.from == Char::ANY || (self.from <= c && c <= self.to)
    }
}

impl fmt::Display for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}

/// Defines the input parameter to the matching methods of a
/// [`crate::Regex`]. Matching is always anchored at `start`; providing only
/// the subject starts at offset 0.
#[derive(Clone, Debug)]
pub struct Input<'s> {
    /// The subject against which the regex is matched. It is expected to be
    /// UTF-8, malformed sequences are handled per [`crate::Config`].
    pub subject: &'s [u8],
    /// Byte offset where the match attempt starts.
    /// Default: 0
    pub start: usize,
}

impl<'s> Input<'s> {
    pub fn new(subject: &'s [u8]) -> Self {
        Self { subject, start: 0 }
    }

    pub fn start(mut self, offset: usize) -> Self {
        self.start = offset;
        self
    }

    pub fn valid(&self) -> bool {
        self.start <= self.subject.len()
    }
}

impl<'s> From<&'s str> for Input<'s> {
    fn from(subject: &'s str) -> Self {
        Self::new(subject.as_bytes())
    }
}

impl<'s> From<&'s [u8]> for Input<'s> {
    fn from(subject: &'s [u8]) -> Self {
        Self::new(subject)
    }
}

impl<'s, const N: usize> From<&'s [u8; N]> for Input<'s> {
    fn from(subject: &'s [u8; N]) -> Self {
        Self::new(subject)
    }
}

/// A span in the subject. Similar to [`std::ops::Range`], but implements
/// Copy.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub from: usize,
    pub to: usize,
}

impl Span {
    pub fn empty(&self) -> bool {
        self.from == self.to
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }
}

impl From<Range<usize>> for Span {
    fn from(value: Range<usize>) -> Self {
        Self {
            from: value.start,
            to: value.end,
        }
    }
}

impl From<Span> for Range<usize> {
    fn from(val: Span) -> Self {
        val.from..val.to
    }
}

/// The longest match found at the requested offset.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub struct Match<'s> {
    pub subject: &'s [u8],
    pub span: Span,
    /// Token id recorded while matching, 0 if no token marker was crossed.
    pub token: u32,
}

impl<'s> Match<'s> {
    pub fn new(subject: &'s [u8], span: impl Into<Span>, token: u32) -> Self {
        Self {
            subject,
            span: span.into(),
            token,
        }
    }

    pub fn start(&self) -> usize {
        self.span.from
    }

    pub fn end(&self) -> usize {
        self.span.to
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.empty()
    }

    pub fn as_bytes(&self) -> &'s [u8] {
        &self.subject[self.span.from..self.span.to]
    }

    /// The matched text, or `None` if it isn't valid UTF-8.
    pub fn as_str(&self) -> Option<&'s str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }
}
