//! A Thompson NFA represented in a bytecode format.
//!
//! This module contains the definition of [`Instruction`], a bytecode format
//! that represents a Thompson's NFA, which is one possible NFA representation
//! of a regular expression whose particularity is to be linearly proportional
//! in size to the pattern. Furthermore compiling a pattern to this
//! representation takes linear time. The compiler is also provided by this
//! module, see [`Compiler`].
use std::{fmt, mem};

use thiserror::Error;

use crate::syntax::Ast;
use crate::util::CharRange;

/// Bytecode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Consume one code point matching the range. The [`crate::Char::ANY`]
    /// sentinel matches everything. With the [`crate::Char::START`] or
    /// [`crate::Char::END`] sentinels this is a zero-width anchor instead.
    Consume(CharRange),
    /// Consume one code point matching any of the ranges, or none of them if
    /// `negated` is true.
    ConsumeClass {
        ranges: Box<[CharRange]>,
        negated: bool,
    },
    Fork2(usize, usize),
    Jmp(usize),
    /// Records the token id and falls through to the next instruction.
    Token(u32),
    Accept,
}

use Instruction::*;

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consume(range) => write!(f, "char {range}"),
            ConsumeClass { ranges, negated } => {
                f.write_str(if *negated { "class ^" } else { "class " })?;
                for range in ranges.iter() {
                    write!(f, "{range}")?;
                }
                Ok(())
            }
            Fork2(a, b) => write!(f, "split {a}, {b}"),
            Jmp(target) => write!(f, "jmp {target}"),
            Token(id) => write!(f, "token {id}"),
            Accept => write!(f, "match"),
        }
    }
}

/// Reasons for rejecting an instruction sequence that wasn't produced by the
/// [`Compiler`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("program has no instructions")]
    Empty,
    #[error("program doesn't end with an accept instruction")]
    MissingAccept,
    #[error("accept instruction at {pc} is not the last one")]
    UnexpectedAccept { pc: usize },
    #[error("instruction at {pc} jumps to {target}, which is out of bounds")]
    InvalidTarget { pc: usize, target: usize },
}

/// A compiled program: the instructions plus the pattern they came from.
///
/// Instructions are addressed by their index. Every jump target is a valid
/// index and the last instruction is the only [`Instruction::Accept`].
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    instructions: Vec<Instruction>,
    source: Box<[u8]>,
}

impl Bytecode {
    /// Builds a program from hand-written instructions, checking the
    /// invariants the virtual machine relies on.
    pub fn from_instructions(
        instructions: Vec<Instruction>,
        source: impl Into<Box<[u8]>>,
    ) -> Result<Self, ProgramError> {
        let len = instructions.len();
        match instructions.last() {
            None => return Err(ProgramError::Empty),
            Some(Accept) => (),
            Some(_) => return Err(ProgramError::MissingAccept),
        }
        for (pc, instruction) in instructions.iter().enumerate() {
            let targets = match instruction {
                Fork2(a, b) => [Some(*a), Some(*b)],
                Jmp(target) => [Some(*target), None],
                Accept if pc != len - 1 => {
                    return Err(ProgramError::UnexpectedAccept { pc });
                }
                _ => [None, None],
            };
            if let Some(target) = targets.into_iter().flatten().find(|t| *t >= len) {
                return Err(ProgramError::InvalidTarget { pc, target });
            }
        }
        Ok(Self {
            instructions,
            source: source.into(),
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The pattern this program was compiled from.
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Pending work of the [`Compiler`].
///
/// Lowering a node emits its leading instructions and pushes the rest of its
/// work as frames, so the compiler never recurses on the tree.
enum Frame {
    Lower(Ast),
    /// The left branch of the alternation at `fork_pc` is done.
    AltRight { fork_pc: usize, right: Ast },
    /// Both branches are done.
    AltEnd {
        fork_pc: usize,
        jmp_pc: usize,
        right_pc: usize,
    },
    StarEnd { fork_pc: usize },
    OptionalEnd { fork_pc: usize },
    PlusEnd { start_pc: usize },
}

/// A compiler from [`Ast`] to this bytecode representation.
#[derive(Debug, Default)]
pub struct Compiler {
    bytecode: Bytecode,
}

impl Compiler {
    /// Lowers the tree, which is consumed in the process, and appends the
    /// final [`Instruction::Accept`].
    pub fn compile(ast: Ast, source: &[u8]) -> Bytecode {
        let mut compiler = Compiler {
            bytecode: Bytecode {
                // Three instructions per pattern byte is a generous bound for
                // this grammar.
                instructions: Vec::with_capacity(source.len() * 3 + 1),
                source: source.into(),
            },
        };
        compiler.compile_internal(ast);
        compiler.push(Accept);
        log::debug!(
            "compiled {:?} into {} instructions",
            String::from_utf8_lossy(source),
            compiler.bytecode.len()
        );
        compiler.bytecode
    }

    fn current_pc(&self) -> usize {
        self.bytecode.instructions.len()
    }

    fn push(&mut self, instruction: Instruction) {
        self.bytecode.instructions.push(instruction);
    }

    fn patch(&mut self, pc: usize, instruction: Instruction) {
        self.bytecode.instructions[pc] = instruction;
    }

    fn compile_internal(&mut self, ast: Ast) {
        let mut frames = vec![Frame::Lower(ast)];

        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Lower(mut ast) => self.lower(&mut ast, &mut frames),
                Frame::AltRight { fork_pc, right } => {
                    let jmp_pc = self.current_pc();
                    // Patched once the right branch is known
                    self.push(Jmp(0));
                    frames.push(Frame::AltEnd {
                        fork_pc,
                        jmp_pc,
                        right_pc: self.current_pc(),
                    });
                    frames.push(Frame::Lower(right));
                }
                Frame::AltEnd {
                    fork_pc,
                    jmp_pc,
                    right_pc,
                } => {
                    self.patch(jmp_pc, Jmp(self.current_pc()));
                    self.patch(fork_pc, Fork2(fork_pc + 1, right_pc));
                }
                Frame::StarEnd { fork_pc } => {
                    self.push(Jmp(fork_pc));
                    self.patch(fork_pc, Fork2(fork_pc + 1, self.current_pc()));
                }
                Frame::OptionalEnd { fork_pc } => {
                    self.patch(fork_pc, Fork2(fork_pc + 1, self.current_pc()));
                }
                Frame::PlusEnd { start_pc } => {
                    self.push(Fork2(start_pc, self.current_pc() + 1));
                }
            }
        }
    }

    /// Emits what comes before the children of `ast`, and schedules the
    /// children followed by what comes after them. Children are moved out,
    /// leaving `ast` a shell.
    fn lower(&mut self, ast: &mut Ast, frames: &mut Vec<Frame>) {
        let take = |child: &mut Box<Ast>| mem::take(&mut **child);

        match ast {
            Ast::Empty => (),
            Ast::Literal(range) => self.push(Consume(*range)),
            Ast::Class { ranges, negated } => self.push(ConsumeClass {
                ranges: mem::take(ranges).into_boxed_slice(),
                negated: *negated,
            }),
            Ast::Token(id) => self.push(Token(*id)),
            Ast::Concat(left, right) => {
                frames.push(Frame::Lower(take(right)));
                frames.push(Frame::Lower(take(left)));
            }
            Ast::Alternation(left, right) => {
                let fork_pc = self.current_pc();
                self.push(Fork2(0, 0));
                frames.push(Frame::AltRight {
                    fork_pc,
                    right: take(right),
                });
                frames.push(Frame::Lower(take(left)));
            }
            Ast::Star(sub) => {
                let fork_pc = self.current_pc();
                self.push(Fork2(0, 0));
                frames.push(Frame::StarEnd { fork_pc });
                frames.push(Frame::Lower(take(sub)));
            }
            Ast::Optional(sub) => {
                let fork_pc = self.current_pc();
                self.push(Fork2(0, 0));
                frames.push(Frame::OptionalEnd { fork_pc });
                frames.push(Frame::Lower(take(sub)));
            }
            Ast::Plus(sub) => {
                frames.push(Frame::PlusEnd {
                    start_pc: self.current_pc(),
                });
                frames.push(Frame::Lower(take(sub)));
            }
        }
    }
}
