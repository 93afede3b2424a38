//! End-to-end scenarios exercising the builder, the DFA builder, and the
//! runtime scanner together.

use std::cell::RefCell;
use std::collections::BTreeSet;

use derive_lex::builder::{any_char, any_with, any_without, char, char_set, string};
use derive_lex::dfa::{make_lexer, raise_on_conflict, select_first};
use derive_lex::error::LexerError;

#[test]
fn build_tracing_is_observable_through_env_logger() {
    // `dfa::build::explore` reports each explored state via `log::debug!`;
    // this only reaches a reader when some subscriber is installed. Wire
    // `env_logger` up here rather than leaving it an unused dev-dependency.
    let _ = env_logger::try_init();

    let dfa = make_lexer(
        vec![("ident", char_set("a-z").unwrap().plus())],
        &select_first,
    )
    .unwrap();
    assert!(dfa.state_count() > 0);
}

#[test]
fn keyword_vs_identifier_with_select_first() {
    let dfa = make_lexer(
        vec![
            ("if", string("if")),
            ("ident", char_set("a-z").unwrap().plus()),
            ("space", char(' ').plus()),
        ],
        &select_first,
    )
    .unwrap();

    let tokens: Vec<_> = dfa.scan_all(b"iffy").collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(tokens, vec![("ident", &b"iffy"[..])]);

    let tokens: Vec<_> = dfa.scan_all(b"if ").collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(tokens, vec![("if", &b"if"[..]), ("space", &b" "[..])]);
}

#[test]
fn nested_block_comment_with_complement() {
    // "/*" . ~(.* . "*/" . .*) . "*/" -- a block comment that doesn't
    // contain "*/" anywhere before its own closing delimiter.
    let body = any_char().star().seq(&string("*/")).seq(&any_char().star()).invert();
    let comment = string("/*").seq(&body).seq(&string("*/"));

    let dfa = make_lexer(
        vec![("comment", comment), ("space", char(' ').plus())],
        &raise_on_conflict,
    )
    .unwrap();

    let tokens: Vec<_> = dfa
        .scan_all(b"/* a */ /* b */")
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let tags: Vec<&str> = tokens.iter().map(|(tag, _)| *tag).collect();
    assert_eq!(tags, vec!["comment", "space", "comment"]);
}

#[test]
fn intersection_and_complement_narrow_the_language() {
    // (a|b)+ & ~(contains "aa") & (contains "bb")
    let ab = char_set("ab").unwrap();
    let pattern = ab
        .plus()
        .intersect(&any_without(&string("aa")))
        .intersect(&any_with(&string("bb")));

    let dfa = make_lexer(vec![("re", pattern)], &raise_on_conflict).unwrap();

    let m = dfa.scan_once(b"abba").unwrap();
    assert_eq!(m.tag, "re");
    assert_eq!(m.length, 4);

    let err = dfa.scan_all(b"abaa").collect::<Result<Vec<_>, _>>().unwrap_err();
    match err {
        derive_lex::error::ScanError::UnrecognisedInput { offset } => assert!(offset >= 2),
    }
}

#[test]
fn conflict_detection_reports_exact_pair_sets() {
    let conflicts: RefCell<Vec<BTreeSet<String>>> = RefCell::new(Vec::new());
    let resolve = |tags: &[u32], names: &[String]| -> Result<String, LexerError> {
        if tags.len() > 1 {
            let set: BTreeSet<String> = tags.iter().map(|&id| names[id as usize].clone()).collect();
            conflicts.borrow_mut().push(set);
        }
        Ok(names[tags[0] as usize].clone())
    };

    let word = char_set("a-z").unwrap().plus().seq(&char(' '));
    let digits = char_set("0-9").unwrap().plus().seq(&char(' '));

    let patterns = vec![
        ("A", word.opt().seq(&string("test"))),
        ("B", digits.opt().seq(&string("test"))),
        ("C", string("test test")),
        (
            "D",
            char_set("0-9")
                .unwrap()
                .plus()
                .seq(&char_set("a-z").unwrap().plus())
                .seq(&char(' '))
                .seq(&string("test")),
        ),
    ];

    make_lexer(patterns, &resolve).unwrap();

    let seen = conflicts.into_inner();
    let ab: BTreeSet<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
    let ac: BTreeSet<String> = ["A", "C"].iter().map(|s| s.to_string()).collect();
    assert!(seen.contains(&ab), "expected an {{A,B}} conflict, saw {:?}", seen);
    assert!(seen.contains(&ac), "expected an {{A,C}} conflict, saw {:?}", seen);
}
