//! An interpreter for [`crate::thompson::bytecode`].

use std::mem;

use crate::{
    regex::Config,
    syntax::{self, Parse, SyntaxError},
    thompson::bytecode::{Bytecode, Compiler, Instruction::*},
    utf8,
    util::{Char, Input, Match},
};

/// A so-called PikeVM.
///
/// This is an interpreter for the bytecode. It tracks every active
/// instruction at once while reading the subject one code point at a time,
/// so it never backtracks and runs in `O(subject × program)` time.
///
/// A `PikeVM` is immutable once built and can be shared between threads.
/// All the scratch memory needed for matching lives in a separate [`State`],
/// which must not be shared.
#[derive(Debug, Clone)]
pub struct PikeVM {
    bytecode: Bytecode,
    config: Config,
}

/// Scratch memory for [`PikeVM::exec`].
///
/// Buffers are sized to the program and reused across calls, so matching in
/// a loop doesn't allocate.
#[derive(Debug, Clone)]
pub struct State {
    /// Consuming instructions alive before reading the current code point.
    active: Vec<usize>,
    /// Consuming instructions alive after reading it.
    next: Vec<usize>,
    /// Last step at which each instruction was visited by the epsilon
    /// closure. An instruction is visited at most once per step.
    visited: Box<[usize]>,
    step: usize,
    /// Pending instructions of the epsilon closure.
    stack: Vec<usize>,
    /// Id written by the last token instruction visited during this match.
    token: u32,
}

impl State {
    fn new(state_count: usize) -> Self {
        Self {
            active: Vec::with_capacity(state_count),
            next: Vec::with_capacity(state_count),
            visited: vec![0; state_count].into_boxed_slice(),
            step: 1,
            stack: Vec::with_capacity(state_count),
            token: 0,
        }
    }

    fn reset(&mut self, state_count: usize) {
        if self.visited.len() != state_count {
            // State created for another program.
            *self = State::new(state_count);
            return;
        }
        self.active.clear();
        self.next.clear();
        self.stack.clear();
        self.visited.fill(0);
        self.step = 1;
        self.token = 0;
    }

    /// Marks `pc` as visited during the current step. Returns false if it
    /// was already.
    #[inline]
    fn visit(&mut self, pc: usize) -> bool {
        let value = &mut self.visited[pc];
        if *value == self.step {
            return false;
        }
        *value = self.step;
        true
    }

    fn swap(&mut self) {
        mem::swap(&mut self.active, &mut self.next);
        self.next.clear();
        self.step += 1;
    }
}

impl PikeVM {
    pub fn from_bytecode(bytecode: Bytecode, config: Config) -> Self {
        Self { bytecode, config }
    }

    /// Parses and compiles `pattern`. Syntax errors don't prevent
    /// compilation, they are returned along with the program.
    pub fn new(pattern: &[u8], config: Config) -> (Self, Vec<SyntaxError>) {
        let Parse { ast, errors } = syntax::parse(pattern);
        let bytecode = Compiler::compile(ast, pattern);
        (Self { bytecode, config }, errors)
    }

    pub fn bytecode(&self) -> &Bytecode {
        &self.bytecode
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return a new State for this program.
    pub fn new_state(&self) -> State {
        State::new(self.bytecode.len())
    }

    /// Adds to `state.next` every consuming instruction reachable from `pc`
    /// without reading input, and returns true if the accept instruction is
    /// reachable too.
    ///
    /// Instructions are explored depth-first, taking the first branch of a
    /// fork before the second one. Every token instruction found along the
    /// way overwrites `state.token`, whether or not its branch leads to the
    /// accept instruction.
    fn epsilon_closure(&self, pc: usize, at_start: bool, at_end: bool, state: &mut State) -> bool {
        let instructions = self.bytecode.instructions();
        let mut accepted = false;

        state.stack.push(pc);

        while let Some(pc) = state.stack.pop() {
            if !state.visit(pc) {
                continue;
            }
            match &instructions[pc] {
                Fork2(a, b) => {
                    state.stack.push(*b);
                    state.stack.push(*a);
                }
                Jmp(target) => {
                    state.stack.push(*target);
                }
                Consume(range) if range.from == Char::START => {
                    if at_start {
                        state.stack.push(pc + 1);
                    }
                }
                Consume(range) if range.from == Char::END => {
                    if at_end {
                        state.stack.push(pc + 1);
                    }
                }
                Token(id) => {
                    state.token = *id;
                    state.stack.push(pc + 1);
                }
                Accept => {
                    accepted = true;
                }
                Consume(_) | ConsumeClass { .. } => {
                    state.next.push(pc);
                }
            }
        }

        accepted
    }

    /// Finds the longest match starting exactly at `input.start`.
    ///
    /// `^` only matches if the attempt starts at offset 0, `$` only at the
    /// end of the subject.
    pub fn exec<'s>(&self, input: Input<'s>, state: &mut State) -> Option<Match<'s>> {
        if !input.valid() {
            return None;
        }

        let Input { subject, start } = input;
        let instructions = self.bytecode.instructions();

        state.reset(instructions.len());

        // Length and token of the longest match so far.
        let mut best = None;

        if self.epsilon_closure(0, start == 0, start == subject.len(), state) {
            best = Some((0, state.token));
        }
        state.swap();

        let mut pos = start;

        while pos < subject.len() && !state.active.is_empty() {
            let c = if self.config.lossy_utf8 {
                let Some(c) = utf8::decode_lossy(subject, &mut pos) else {
                    break;
                };
                c
            } else {
                match utf8::decode(subject, &mut pos) {
                    Ok(c) => c,
                    Err(err) => {
                        log::warn!("{err}, giving up");
                        return None;
                    }
                }
            };

            let at_end = pos == subject.len();

            for i in 0..state.active.len() {
                let pc = state.active[i];
                let is_match = match &instructions[pc] {
                    Consume(range) => range.matches(c),
                    ConsumeClass { ranges, negated } => {
                        ranges.iter().any(|r| r.matches(c)) != *negated
                    }
                    instruction => {
                        log::error!("can't execute instruction `{instruction}` at {pc}");
                        return None;
                    }
                };
                if is_match && self.epsilon_closure(pc + 1, false, at_end, state) {
                    let len = pos - start;
                    if best.is_none_or(|(best_len, _)| len > best_len) {
                        best = Some((len, state.token));
                    }
                }
            }

            state.swap();
        }

        best.map(|(len, token)| Match::new(subject, start..start + len, token))
    }

    /// Returns true if there's a match at `input.start`.
    pub fn is_match(&self, input: Input<'_>, state: &mut State) -> bool {
        self.exec(input, state).is_some()
    }
}
