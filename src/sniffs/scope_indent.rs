use crate::annotate::AnnotatedTokens;
use crate::sniff::{PropertySpec, Sniff, SniffContext, SniffFlow};
use crate::tokens::{Dialect, TokenKind};

use super::{set_indent, starts_line};

/// Statements must be indented one level per enclosing scope.
///
/// Runs once per file. Lines inside parentheses, arrays and brace pairs that
/// do not belong to a scope owner are continuation lines and are not checked.
pub struct ScopeIndent;

impl Sniff for ScopeIndent {
    fn code(&self) -> &'static str {
        "Generic.WhiteSpace.ScopeIndent"
    }

    fn description(&self) -> &'static str {
        "Code must be indented one level for each enclosing scope"
    }

    fn register(&self) -> &'static [TokenKind] {
        &TokenKind::ALL
    }

    fn dialects(&self) -> &'static [Dialect] {
        &[Dialect::Php, Dialect::Js]
    }

    fn properties(&self) -> Vec<PropertySpec> {
        vec![
            PropertySpec::int("indent", 4, "Spaces per indentation level"),
            PropertySpec::bool(
                "exact",
                true,
                "Also report lines indented deeper than expected",
            ),
        ]
    }

    fn process(&self, ctx: &mut SniffContext<'_>, _index: usize) -> SniffFlow {
        let tokens = ctx.tokens();
        let width = usize::try_from(ctx.properties().int("indent")).unwrap_or(0);
        let exact = ctx.properties().bool("exact");

        let mut plain_braces: Vec<usize> = Vec::new();
        for index in 0..tokens.len() {
            let ann = tokens.annotation(index);
            if plain_braces.last() == Some(&index) {
                plain_braces.pop();
            }
            let checked = plain_braces.is_empty();
            if ann.kind == TokenKind::OpenCurlyBracket && ann.scope_condition.is_none() {
                if let Some(partner) = ann.bracket_partner {
                    plain_braces.push(partner);
                }
            }
            if !checked || !starts_line(tokens, index) || !is_statement_start(tokens, index) {
                continue;
            }

            let expected = expected_indent(tokens, index) * width;
            let found = tokens.token(index).column - 1;
            if found == expected || (!exact && found > expected) {
                continue;
            }
            let message =
                format!("Line indented incorrectly; expected {expected} spaces, found {found}");
            ctx.add_fixable_error(index, "Incorrect", message, |cs| {
                set_indent(cs, tokens, index, expected);
            });
        }
        SniffFlow::SkipFile
    }
}

/// Whether the token at `index` begins a statement, a scope body or closes one.
fn is_statement_start(tokens: &AnnotatedTokens, index: usize) -> bool {
    let ann = tokens.annotation(index);
    let kind = ann.kind;
    if kind.is_insignificant()
        || !ann.parenthesis_stack.is_empty()
        || matches!(
            kind,
            TokenKind::InlineHtml
                | TokenKind::OpenTag
                | TokenKind::OpenTagWithEcho
                | TokenKind::CloseTag
                | TokenKind::StringContent
                | TokenKind::HeredocEnd
                | TokenKind::NowdocEnd
                | TokenKind::InterpolationClose
                | TokenKind::Malformed
        )
    {
        return false;
    }
    if kind == TokenKind::CloseCurlyBracket {
        return true;
    }
    if kind == TokenKind::OpenCurlyBracket && ann.scope_opener == Some(index) {
        return true;
    }
    let Some(prev) = tokens.prev_significant(index) else {
        return true;
    };
    let prev_ann = tokens.annotation(prev);
    match prev_ann.kind {
        TokenKind::Semicolon
        | TokenKind::CloseCurlyBracket
        | TokenKind::OpenTag
        | TokenKind::CloseTag => true,
        TokenKind::OpenCurlyBracket | TokenKind::Colon => prev_ann.scope_opener == Some(prev),
        _ => false,
    }
}

/// Expected depth in levels for a statement token.
fn expected_indent(tokens: &AnnotatedTokens, index: usize) -> usize {
    let ann = tokens.annotation(index);
    let mut level = ann.nesting_level;
    // A `break` that ends a case body belongs to the body.
    if let Some(owner) = ann.scope_condition {
        let closes_case = owner != index
            && ann.scope_closer == Some(index)
            && matches!(tokens.kind(owner), TokenKind::Case | TokenKind::Default)
            && !matches!(
                ann.kind,
                TokenKind::CloseCurlyBracket | TokenKind::Case | TokenKind::Default
            );
        if closes_case {
            level += 1;
        }
    }
    level
}

#[cfg(test)]
mod tests {
    use crate::sniffs::testing::{check, fixed, only, ruleset};
    use crate::tokens::Dialect;

    const RULE: &str = "Generic.WhiteSpace.ScopeIndent";

    #[test]
    fn test_correct_nesting_is_clean() {
        let ruleset = only(RULE);
        let source = "<?php\nclass A\n{\n    public function f($x)\n    {\n        if ($x) {\n            return [\n                1,\n              2,\n            ];\n        }\n        return 0;\n    }\n}\n";
        assert!(check(&ruleset, source, Dialect::Php).is_empty());
    }

    #[test]
    fn test_reports_expected_and_found() {
        let ruleset = only(RULE);
        let violations = check(&ruleset, "function f() {\n  return 1;\n}\n", Dialect::Js);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
        assert_eq!(
            violations[0].message,
            "Line indented incorrectly; expected 4 spaces, found 2"
        );
    }

    #[test]
    fn test_switch_bodies() {
        let ruleset = only(RULE);
        let source = "<?php\nswitch ($a) {\n    case 1:\n        foo();\n        break;\n    default:\n        bar();\n}\n";
        assert!(check(&ruleset, source, Dialect::Php).is_empty());
    }

    #[test]
    fn test_object_literals_are_continuation_lines() {
        let ruleset = only(RULE);
        let source = "var o = {\n      a: 1,\n  b: 2\n};\n";
        assert!(check(&ruleset, source, Dialect::Js).is_empty());
    }

    #[test]
    fn test_inexact_allows_deeper_indent() {
        let ruleset = ruleset(
            "[[rule]]\nref = \"Generic.WhiteSpace.ScopeIndent\"\nproperties = { exact = false, indent = 2 }\n",
        );
        let source = "if (a) {\n      b();\nc();\n}\n";
        let violations = check(&ruleset, source, Dialect::Js);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 3);
    }

    #[test]
    fn test_fix_inserts_and_replaces() {
        let ruleset = only(RULE);
        let report = fixed(&ruleset, "<?php\nif ($a) {\nfoo();\n        bar();\n  }\n", Dialect::Php);
        assert_eq!(report.source, "<?php\nif ($a) {\n    foo();\n    bar();\n}\n");
        assert!(report.outcome.is_converged());
    }
}
