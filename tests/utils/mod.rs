use pikeregex::Regex;
use regex as rust_regex;

/// Compile `pattern` with pikeregex, panicking if it had to recover from
/// syntax errors.
pub fn compile(pattern: &str) -> Regex {
    let re = Regex::new(pattern);
    assert!(
        re.diagnostics().is_empty(),
        "Pattern {:?} has diagnostics: {:?}",
        pattern,
        re.diagnostics()
    );
    re
}

/// Consecutive anchored matches of `re` in `input`, each starting where the
/// previous one ended, stopping at the first failure or empty match.
fn rust_tokens(re: &rust_regex::Regex, input: &str) -> Vec<(usize, usize)> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while let Some(m) = re.find(&input[pos..]) {
        if m.is_empty() {
            break;
        }
        tokens.push((pos + m.start(), pos + m.end()));
        pos += m.end();
    }
    tokens
}

/// Match a pattern against a given input with both pikeregex and rust-regex,
/// and compare the results.
///
/// Our matches are anchored and longest, while rust-regex searches and
/// prefers the leftmost-first alternative. The reference pattern is anchored
/// with `^`, and cases must be chosen so that the leftmost-first match is
/// also the longest one.
pub fn check_against_rust_regex(pattern: &str, input: &str) {
    let reference = format!("^(?:{pattern})");
    let rust_re = rust_regex::Regex::new(&reference)
        .unwrap_or_else(|e| panic!("rust-regex failed to compile {reference:?}: {e}"));
    let mut ours = compile(pattern);

    // find
    let rust_match = rust_re.find(input).map(|m| (m.start(), m.end()));
    let my_match = ours.find(input).map(|m| (m.start(), m.end()));
    assert_eq!(
        my_match, rust_match,
        "Mismatch for pattern {:?} input {:?} (find)",
        pattern, input
    );

    // tokenize
    let rust_all = rust_tokens(&rust_re, input);
    let my_all: Vec<_> = ours
        .tokenize(input)
        .map(|m| (m.start(), m.end()))
        .collect();
    assert_eq!(
        my_all, rust_all,
        "Mismatch for pattern {:?} input {:?} (tokenize)",
        pattern, input
    );
}
