use std::fmt;
use std::mem;

use crate::util::CharRange;

/// Abstract syntax tree of a pattern.
///
/// Each node owns its children. The tree only lives between parsing and code
/// generation, which consumes it.
///
/// Concatenations and alternations form left-deep spines as long as the
/// pattern, so nothing walking the tree may recurse on it. Dropping, lowering
/// and rendering all use an explicit stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Ast {
    /// Matches the empty string. Also stands in for constructs that failed
    /// to parse.
    #[default]
    Empty,
    /// A code point, a range, or one of the `.`, `^` and `$` sentinels.
    Literal(CharRange),
    Concat(Box<Ast>, Box<Ast>),
    Alternation(Box<Ast>, Box<Ast>),
    Star(Box<Ast>),
    Optional(Box<Ast>),
    Plus(Box<Ast>),
    /// A bracket class such as `[a-z_]` or `[^0-9]`.
    Class { ranges: Vec<CharRange>, negated: bool },
    /// Zero-width `\m<id>` marker.
    Token(u32),
}

impl Ast {
    pub fn concat(left: Ast, right: Ast) -> Ast {
        Ast::Concat(Box::new(left), Box::new(right))
    }

    pub fn alternation(left: Ast, right: Ast) -> Ast {
        Ast::Alternation(Box::new(left), Box::new(right))
    }

    pub fn class(ranges: impl Into<Vec<CharRange>>, negated: bool) -> Ast {
        Ast::Class {
            ranges: ranges.into(),
            negated,
        }
    }

    /// True for nodes without children.
    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            Ast::Concat(..) | Ast::Alternation(..) | Ast::Star(_) | Ast::Optional(_) | Ast::Plus(_)
        )
    }
}

impl Drop for Ast {
    fn drop(&mut self) {
        match &*self {
            Ast::Concat(l, r) | Ast::Alternation(l, r) if l.is_leaf() && r.is_leaf() => return,
            Ast::Star(sub) | Ast::Optional(sub) | Ast::Plus(sub) if sub.is_leaf() => return,
            ast if ast.is_leaf() => return,
            _ => (),
        }

        // Detach every child before its parent goes away, so each node is
        // dropped with leaves only.
        let mut stack = vec![mem::take(self)];
        while let Some(mut ast) = stack.pop() {
            match &mut ast {
                Ast::Concat(l, r) | Ast::Alternation(l, r) => {
                    stack.push(mem::take(&mut **l));
                    stack.push(mem::take(&mut **r));
                }
                Ast::Star(sub) | Ast::Optional(sub) | Ast::Plus(sub) => {
                    stack.push(mem::take(&mut **sub));
                }
                _ => (),
            }
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Piece<'a> {
            Node(&'a Ast),
            Text(&'static str),
        }

        let mut stack = vec![Piece::Node(self)];

        while let Some(piece) = stack.pop() {
            let ast = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Node(ast) => ast,
            };
            match ast {
                Ast::Empty => (),
                Ast::Literal(range) => write!(f, "{range}")?,
                Ast::Concat(l, r) => {
                    stack.push(Piece::Node(r));
                    stack.push(Piece::Node(l));
                }
                Ast::Alternation(l, r) => {
                    f.write_str("(")?;
                    stack.push(Piece::Text(")"));
                    stack.push(Piece::Node(r));
                    stack.push(Piece::Text("|"));
                    stack.push(Piece::Node(l));
                }
                Ast::Star(sub) | Ast::Optional(sub) | Ast::Plus(sub) => {
                    f.write_str("(")?;
                    stack.push(Piece::Text(match ast {
                        Ast::Star(_) => ")*",
                        Ast::Optional(_) => ")?",
                        _ => ")+",
                    }));
                    stack.push(Piece::Node(sub));
                }
                Ast::Class { ranges, negated } => {
                    f.write_str(if *negated { "[^" } else { "[" })?;
                    for range in ranges {
                        write!(f, "{range}")?;
                    }
                    f.write_str("]")?;
                }
                Ast::Token(id) => write!(f, "\\m{id}")?,
            }
        }

        Ok(())
    }
}
