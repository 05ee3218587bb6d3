//! Human-readable renderings of a compiled program, for debugging.
//!
//! [`write_dot`] produces a graphviz graph with one node per instruction
//! (plus a record node listing the members of each class),
//! [`write_listing`] one line per instruction.

use std::io;

use crate::thompson::bytecode::{Bytecode, Instruction::*};
use crate::util::CharRange;

/// Escapes `text` for use inside a double-quoted dot string.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Label of the record node listing the members of a class. Characters
/// with a meaning in record labels are escaped too.
fn class_record(ranges: &[CharRange], negated: bool) -> String {
    let mut label = String::from(if negated { "<0>none of" } else { "<0>one of" });
    for range in ranges {
        label.push('|');
        for c in range.to_string().chars() {
            if matches!(c, '"' | '\\' | '|' | '{' | '}' | '<' | '>') {
                label.push('\\');
            }
            label.push(c);
        }
    }
    label
}

/// Writes the program as a graphviz digraph, labelled with the pattern it
/// was compiled from. Edges reading input are labelled with what they
/// accept, the accept instruction is a double circle.
pub fn write_dot<W: io::Write>(bytecode: &Bytecode, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph pikeregex {{")?;
    writeln!(
        out,
        "label=\"{}\"",
        escape(&String::from_utf8_lossy(bytecode.source()))
    )?;
    writeln!(out, "fontcolor=blue")?;
    writeln!(out, "node [shape=circle width=0.25 label=\"\"];")?;
    writeln!(out, "edge [label=\" \"];")?;
    writeln!(out, "0 [label=\"S0\"];")?;
    writeln!(out, "rankdir=LR;")?;

    for (pc, instruction) in bytecode.instructions().iter().enumerate() {
        match instruction {
            Consume(range) => {
                let label = escape(&range.to_string());
                writeln!(out, "{pc} -> {} [label=\"{label}\"];", pc + 1)?;
            }
            ConsumeClass { ranges, negated } => {
                // The members hang off a record node between this state and
                // the next one.
                let label = class_record(ranges, *negated);
                writeln!(out, "{pc} -> c{pc}:0;")?;
                writeln!(out, "c{pc}:0 -> {};", pc + 1)?;
                writeln!(out, "c{pc} [shape=record label=\"{label}\"];")?;
            }
            Fork2(a, b) => {
                writeln!(out, "{pc} -> {a};")?;
                writeln!(out, "{pc} -> {b};")?;
            }
            Jmp(target) => writeln!(out, "{pc} -> {target};")?,
            Token(id) => {
                writeln!(out, "{pc} [label=\"Token|{id}\" shape=record];")?;
                writeln!(out, "{pc} -> {};", pc + 1)?;
            }
            Accept => writeln!(out, "{pc} [label=\"S{pc}\" shape=doublecircle];")?,
        }
    }

    writeln!(out, "}}")
}

/// Writes one `pc: instruction` line per instruction, in order.
pub fn write_listing<W: io::Write>(bytecode: &Bytecode, out: &mut W) -> io::Result<()> {
    for (pc, instruction) in bytecode.instructions().iter().enumerate() {
        writeln!(out, "{pc:2}: {instruction}")?;
    }
    Ok(())
}
