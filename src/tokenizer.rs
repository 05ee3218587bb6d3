//! Combines several patterns into one program that reports which of them
//! matched.
//!
//! Each pattern is wrapped in a group followed by a `\m<id>` marker, and the
//! results are joined with `|`:
//!
//! ```
//! use pikeregex::tokenizer::combine;
//!
//! assert_eq!(combine(&[("[0-9]+", 1), ("[a-z]+", 2)]), r"([0-9]+)\m1|([a-z]+)\m2");
//! ```
//!
//! The combined pattern goes through the regular parser and compiler, there's
//! nothing special about it afterwards.

use std::collections::HashSet;

/// Builds the combined pattern for `definitions`, given as
/// `(pattern, token id)` pairs, in order.
///
/// Ids are expected to be distinct and nonzero, since 0 stands for "no
/// token". This isn't enforced, suspicious ids are only logged.
pub fn combine(definitions: &[(&str, u32)]) -> String {
    let mut seen = HashSet::with_capacity(definitions.len());
    let mut pattern = String::new();

    for (i, (sub_pattern, id)) in definitions.iter().enumerate() {
        if *id == 0 {
            log::warn!("token {sub_pattern:?} has id 0, matches won't be told apart from no token");
        } else if !seen.insert(*id) {
            log::warn!("token id {id} is used more than once");
        }
        if i > 0 {
            pattern.push('|');
        }
        pattern.push('(');
        pattern.push_str(sub_pattern);
        pattern.push_str(")\\m");
        pattern.push_str(&id.to_string());
    }

    pattern
}
