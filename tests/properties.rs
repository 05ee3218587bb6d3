use pikeregex::thompson::pike_vm::PikeVM;
use pikeregex::{Input, Regex, compile, compile_tokenizer};
use pretty_assertions::assert_eq;

/// (start, length) of the match at `offset`.
fn find(pattern: &str, subject: &str, offset: usize) -> Option<(usize, usize)> {
    compile(pattern)
        .find_at(subject.as_bytes(), offset)
        .map(|m| (m.start(), m.len()))
}

#[test]
fn single_char() {
    assert_eq!(find("a", "a", 0), Some((0, 1)));
    assert_eq!(find("a", "b", 0), None);
}

#[test]
fn star_in_the_middle() {
    assert_eq!(find("ab*c", "ac", 0), Some((0, 2)));
    assert_eq!(find("ab*c", "abc", 0), Some((0, 3)));
    assert_eq!(find("ab*c", "abbbbc", 0), Some((0, 6)));
    assert_eq!(find("ab*c", "a", 0), None);
}

#[test]
fn bracket_class() {
    for subject in ["a", "b", "c"] {
        assert_eq!(find("[a-c]", subject, 0), Some((0, 1)));
        assert_eq!(find("[^a-c]", subject, 0), None);
    }
    assert_eq!(find("[a-c]", "d", 0), None);
    assert_eq!(find("[^a-c]", "d", 0), Some((0, 1)));
    assert_eq!(find("[^a-c]", "ж", 0), Some((0, 2)));
}

#[test]
fn anchors() {
    assert_eq!(find("^abc$", "abc", 0), Some((0, 3)));
    assert_eq!(find("^abc$", "xabc", 1), None);
    assert_eq!(find("abc$", "xabc", 1), Some((1, 3)));
}

#[test]
fn longest_match() {
    assert_eq!(find("a|ab", "ab", 0), Some((0, 2)));
}

#[test]
fn tokenizer() {
    let mut re = compile_tokenizer(&[("abc", 1), ("xyz", 2)]);
    assert_eq!(re.find("abc").map(|m| m.token), Some(1));
    assert_eq!(re.find("xyz").map(|m| m.token), Some(2));
    assert_eq!(re.find("qqq"), None);
}

#[test]
fn token_of_a_branch_that_did_not_accept() {
    // Both definitions accept the empty string in the same closure. The
    // marker of the second one is visited last and overwrites the first id.
    let mut re = compile_tokenizer(&[("x*", 1), ("y*", 2)]);
    assert_eq!(re.find("").map(|m| m.token), Some(2));

    // Across threads the first accepting one wins.
    let mut re = compile_tokenizer(&[("a", 1), ("a", 2)]);
    assert_eq!(re.find("a").map(|m| m.token), Some(1));

    let mut re = Regex::new(r"a(\m2|\m1x)");
    assert_eq!(re.find("a").map(|m| m.token), Some(1));
}

#[test]
fn idempotence() {
    let subject = "ab123 rest";
    let mut first = compile(r"[a-z]+\d+");
    let mut second = compile(r"[a-z]+\d+");
    let expected = Some((0, 5));
    for _ in 0..3 {
        assert_eq!(first.find(subject).map(|m| (m.start(), m.len())), expected);
        assert_eq!(second.find(subject).map(|m| (m.start(), m.len())), expected);
        assert_eq!(first.find("zz"), None);
    }
    assert_eq!(
        first.bytecode().instructions(),
        second.bytecode().instructions()
    );
}

#[test]
fn long_literal() {
    let pattern = "a".repeat(100_000);
    let mut re = compile(&pattern);
    assert_eq!(re.find(pattern.as_str()).map(|m| m.len()), Some(100_000));
    assert_eq!(re.find(&pattern[1..]), None);
    re.release();
}

#[test]
fn many_alternatives() {
    let words: Vec<String> = (0..5_000).map(|i| format!("w{i}")).collect();
    let mut re = compile(&words.join("|"));
    assert_eq!(re.find("w4999").map(|m| m.len()), Some(5));
    assert_eq!(re.find("w5000").map(|m| m.len()), Some(4));
    assert_eq!(re.find("x"), None);
}

#[test]
fn many_token_definitions() {
    let words: Vec<String> = (0..5_000).map(|i| format!("w{i}")).collect();
    let definitions: Vec<(&str, u32)> = words
        .iter()
        .zip(1..)
        .map(|(word, id)| (word.as_str(), id))
        .collect();
    let mut re = compile_tokenizer(&definitions);
    assert!(re.diagnostics().is_empty());
    assert_eq!(
        re.find("w4999").map(|m| (m.len(), m.token)),
        Some((5, 5_000))
    );
    assert_eq!(re.find("w12!").map(|m| (m.len(), m.token)), Some((3, 13)));
}

#[test]
fn stacked_repetitions() {
    let mut re = compile(&format!("a{}b", "*".repeat(50_000)));
    assert_eq!(re.find("aaab").map(|m| m.len()), Some(4));
    assert_eq!(re.find("b").map(|m| m.len()), Some(1));
}

#[test]
fn recovered_program_still_matches() {
    let mut re = compile(r"(ab|c\q");
    assert_eq!(re.diagnostics().len(), 2);
    assert_eq!(re.find("ab").map(|m| m.len()), Some(2));
    assert_eq!(re.find("c").map(|m| m.len()), Some(1));
}

#[test]
fn searching_by_retrying_offsets() {
    let mut re = compile(r"\d+");
    let subject = b"abc 2024 x";
    let found = (0..=subject.len()).find_map(|offset| re.find_at(subject, offset));
    assert_eq!(found.map(|m| (m.start(), m.end())), Some((4, 8)));
}

#[test]
fn shared_program_private_states() {
    let re = compile(r"(\w+)\m1|(\d+\.\d+)\m2");
    let vm: &PikeVM = re.pike_vm();
    let subjects = ["hello", "3.14", "x_1", "2.5!", "...."];

    std::thread::scope(|scope| {
        let handles: Vec<_> = subjects
            .iter()
            .map(|subject| {
                scope.spawn(move || {
                    let mut state = vm.new_state();
                    (0..100)
                        .map(|_| {
                            vm.exec(Input::from(*subject), &mut state)
                                .map(|m| (m.len(), m.token))
                        })
                        .last()
                        .flatten()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(
            results,
            vec![
                Some((5, 1)),
                Some((4, 2)),
                Some((3, 1)),
                Some((3, 2)),
                None
            ]
        );
    });
}
