// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property tests over generated calc() expressions and over arbitrary
//! text.
//!
//! These check that:
//! 1. printing a parsed tree reproduces the input byte for byte
//! 2. the token list covers the input contiguously from offset 0
//! 3. parse-print is idempotent
//! 4. well-formed expressions parse without errors, and the autofix
//!    printer doesn't change what they mean

use proptest::prelude::*;

use csscalc::json::to_simple_value;
use csscalc::{ParseOptions, StringifyOptions, parse, parse_with, stringify, tokenize};

fn space() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(" ".to_string()),
        Just("  ".to_string()),
        Just("\n\t".to_string()),
        Just(" /* c */ ".to_string()),
    ]
}

fn maybe_space() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), space()]
}

fn atom() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000).prop_map(|n| n.to_string()),
        (0u32..100).prop_map(|n| format!("{}.5", n)),
        Just(".25".to_string()),
        (1u32..500, "(px|em|rem|vw|PX|Q)").prop_map(|(n, u)| format!("{n}{u}")),
        (1u32..100).prop_map(|n| format!("{n}%")),
        (1u32..360, "(deg|turn|rad)").prop_map(|(n, u)| format!("{n}{u}")),
        (1u32..10, "(s|ms)").prop_map(|(n, u)| format!("{n}{u}")),
        Just("auto".to_string()),
        Just("var(--gap)".to_string()),
    ]
}

/// A well-formed expression.  `+`, `-` and `/` always have whitespace
/// on both sides, as CSS requires of `+` and `-`.
fn expr() -> impl Strategy<Value = String> {
    atom().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            (
                inner.clone(),
                space(),
                "[-+/]",
                space(),
                inner.clone()
            )
                .prop_map(|(l, s1, op, s2, r)| format!("{l}{s1}{op}{s2}{r}")),
            (
                inner.clone(),
                maybe_space(),
                maybe_space(),
                inner.clone()
            )
                .prop_map(|(l, s1, s2, r)| format!("{l}{s1}*{s2}{r}")),
            (maybe_space(), inner.clone(), maybe_space())
                .prop_map(|(s1, e, s2)| format!("({s1}{e}{s2})")),
            (inner.clone(), maybe_space()).prop_map(|(e, s)| format!("calc({e}{s})")),
            (inner.clone(), inner.clone(), maybe_space())
                .prop_map(|(a, b, s)| format!("min({a},{s}{b})")),
            (inner.clone(), inner.clone(), inner)
                .prop_map(|(a, b, c)| format!("clamp({a}, {b}, {c})")),
        ]
    })
}

fn any_text() -> impl Strategy<Value = String> {
    r#"[a-z0-9 .+*/%(),'"{}\[\]\\\n-]{0,40}"#
}

fn assert_covered(text: &str, inline_comments: bool) {
    let options = ParseOptions::default().with_inline_comments(inline_comments);
    let (tokens, _) = tokenize(text, options);
    let mut pos = 0;
    for token in &tokens {
        assert_eq!(pos, token.loc.start, "{text:?}");
        assert!(token.loc.end > token.loc.start, "{text:?}");
        assert_eq!(&text[token.loc.start..token.loc.end], token.value);
        pos = token.loc.end;
    }
    assert_eq!(text.len(), pos, "{text:?}");
}

proptest! {
    #[test]
    fn generated_expressions_round_trip(e in expr()) {
        let root = parse(&e);
        prop_assert_eq!(&e, &root.to_string());
    }

    #[test]
    fn generated_expressions_parse_cleanly(e in expr()) {
        let root = parse(&format!("calc({e})"));
        prop_assert!(root.errors().is_empty(), "{}: {:?}", e, root.errors());
        prop_assert_eq!(1, root.nodes.len());
    }

    #[test]
    fn autofix_preserves_meaning(e in expr()) {
        let root = parse(&e);
        let fixed = stringify(&root, StringifyOptions::default().with_autofix(true));
        let reparsed = parse(&fixed);
        prop_assert_eq!(
            to_simple_value(&root).unwrap(),
            to_simple_value(&reparsed).unwrap(),
            "{:?} -> {:?}",
            e,
            fixed
        );
    }

    #[test]
    fn arbitrary_text_round_trips(text in any_text(), inline_comments in any::<bool>()) {
        let options = ParseOptions::default().with_inline_comments(inline_comments);
        let root = parse_with(&text, options);
        prop_assert_eq!(&text, &root.to_string());

        let tokens: String = root.tokens().iter().map(|t| t.value.as_str()).collect();
        prop_assert_eq!(&text, &tokens);
        assert_covered(&text, inline_comments);
    }

    #[test]
    fn parse_print_is_idempotent(text in any_text()) {
        let once = parse(&text).to_string();
        let twice = parse(&once).to_string();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn errors_are_sorted_and_unique(text in any_text()) {
        let root = parse(&text);
        let errors = root.errors();
        for pair in errors.windows(2) {
            prop_assert!(pair[0].index <= pair[1].index);
            prop_assert!(pair[0] != pair[1]);
        }
        for err in errors {
            prop_assert!(err.index <= text.len());
        }
    }
}

#[test]
fn non_ascii_round_trips() {
    for text in ["calc(1px + ünïcode)", "'日本' 1em", "/* ✓ */ 2px", "--∆(1)"] {
        assert_covered(text, true);
        assert_eq!(text, parse(text).to_string());
    }
}
