use proptest::prelude::*;
use sniffwright::annotate::annotate;
use sniffwright::fixer::FixOutcome;
use sniffwright::tokens::render;
use sniffwright::{
    dispatch, fix, tokenize, AnnotatedTokens, Dialect, DispatchOptions, FixOptions, LexOptions,
};

use super::ruleset;

const FRAGMENTS: &[&str] = &[
    "if", "else", "while", "switch", "case 1:", "default:", "break;", "function", "fn",
    "array", "ECHO", "return", "=>", "(", ")", "{", "}", "[", "]", ";", ",", ":", "?",
    " ", "  ", "\n", "\r\n", "\t", "$a", "x", "1", "'s'", "\"d\"", "// c\n", "/* c */",
    "é", "?>", "<?php ",
];

fn php_source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..48)
        .prop_map(|parts| format!("<?php\n{}", parts.concat()))
}

const CSS_FRAGMENTS: &[&str] = &[
    "a", ".nav", "#x", "@media", "screen", "color", "red", "1px", "url(x)", "{", "}", "(",
    ")", "[", "]", ":", ";", ",", " ", "\n", "\t", "'s'", "\"d\"", "/* c */", "!important",
];

fn js_source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..48).prop_map(|parts| parts.concat())
}

fn css_source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(CSS_FRAGMENTS), 0..48)
        .prop_map(|parts| parts.concat())
}

/// A source paired with the dialect it is lexed as.
fn any_source() -> impl Strategy<Value = (Dialect, String)> {
    prop_oneof![
        php_source().prop_map(|s| (Dialect::Php, s)),
        js_source().prop_map(|s| (Dialect::Js, s)),
        css_source().prop_map(|s| (Dialect::Css, s)),
    ]
}

fn annotated(source: &str, dialect: Dialect) -> AnnotatedTokens {
    AnnotatedTokens::from_source(source, LexOptions::new(dialect))
}

proptest! {
    #[test]
    fn tokens_cover_source((dialect, source) in any_source()) {
        let tokens = annotated(&source, dialect);
        prop_assert_eq!(render(tokens.tokens()), source.clone());
        let mut offset = 0;
        for token in tokens.tokens() {
            prop_assert_eq!(token.offset, offset);
            offset = token.end();
        }
        prop_assert_eq!(offset, source.len());
    }

    #[test]
    fn annotation_is_a_function_of_tokens(source in php_source()) {
        let tokens = tokenize(&source, Dialect::Php);
        prop_assert_eq!(annotate(&tokens, Dialect::Php), annotate(&tokens, Dialect::Php));
        let again = tokenize(&render(&tokens), Dialect::Php);
        prop_assert_eq!(annotate(&again, Dialect::Php), annotate(&tokens, Dialect::Php));
    }

    #[test]
    fn bracket_partners_are_symmetric((dialect, source) in any_source()) {
        let tokens = annotated(&source, dialect);
        for (i, ann) in tokens.annotations().iter().enumerate() {
            if let Some(partner) = ann.bracket_partner {
                prop_assert_eq!(tokens.annotation(partner).bracket_partner, Some(i));
                prop_assert!(!ann.unmatched);
            }
        }
    }

    #[test]
    fn bracket_pairs_never_cross((dialect, source) in any_source()) {
        let tokens = annotated(&source, dialect);
        let pairs: Vec<(usize, usize)> = tokens
            .annotations()
            .iter()
            .enumerate()
            .filter_map(|(i, ann)| ann.bracket_partner.filter(|&p| p > i).map(|p| (i, p)))
            .collect();
        for &(a, b) in &pairs {
            for &(c, d) in &pairs {
                prop_assert!(!(a < c && c < b && b < d), "({a},{b}) crosses ({c},{d})");
            }
        }
    }

    #[test]
    fn dispatch_is_deterministic(source in php_source()) {
        let ruleset = ruleset("[[rule]]\nref = \"PSR12\"\n[[rule]]\nref = \"Generic\"\n");
        let tokens = annotated(&source, Dialect::Php);
        let options = DispatchOptions::for_ruleset(&ruleset).with_fixing(true);
        let first = dispatch(&tokens, &ruleset, &options);
        let second = dispatch(&tokens, &ruleset, &options);
        prop_assert_eq!(first.violations, second.violations);
        prop_assert_eq!(first.proposals.len(), second.proposals.len());
    }

    #[test]
    fn fix_loop_is_bounded(source in js_source()) {
        let ruleset = ruleset("[[rule]]\nref = \"Generic\"\n[[rule]]\nref = \"Squiz\"\n");
        let options = FixOptions { max_passes: Some(4), timeout: None };
        let report = fix(&source, Dialect::Js, &ruleset, &options);
        prop_assert!(report.passes >= 1 && report.passes <= 4);
        if report.outcome == FixOutcome::Converged {
            prop_assert!(report.remaining.iter().all(|v| !v.fixable));
        }
    }

    #[test]
    fn converged_output_is_a_fixed_point(source in php_source()) {
        let ruleset = ruleset("[[rule]]\nref = \"PSR12\"\n");
        let report = fix(&source, Dialect::Php, &ruleset, &FixOptions::default());
        if report.outcome.is_converged() {
            let again = fix(&report.source, Dialect::Php, &ruleset, &FixOptions::default());
            prop_assert_eq!(again.source, report.source);
            prop_assert_eq!(again.passes, 1);
            prop_assert_eq!(again.fixed, 0);
        }
    }
}
