use crate::annotate::AnnotatedTokens;
use crate::sniff::{Sniff, SniffContext, SniffFlow};
use crate::tokens::{Dialect, TokenKind};

/// `property: value` in style declarations: no space before the colon,
/// exactly one after it.
pub struct ColonSpacing;

impl Sniff for ColonSpacing {
    fn code(&self) -> &'static str {
        "Squiz.CSS.ColonSpacing"
    }

    fn description(&self) -> &'static str {
        "Style declarations need no space before the colon and one after it"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[TokenKind::Colon]
    }

    fn dialects(&self) -> &'static [Dialect] {
        &[Dialect::Css]
    }

    fn process(&self, ctx: &mut SniffContext<'_>, index: usize) -> SniffFlow {
        let tokens = ctx.tokens();
        if !in_declaration(tokens, index) {
            return SniffFlow::Continue;
        }

        if let Some(prev) = index.checked_sub(1) {
            let token = tokens.token(prev);
            if token.kind == TokenKind::Whitespace {
                ctx.add_fixable_error(
                    index,
                    "Before",
                    "There must be no space before a colon in a style definition",
                    |cs| {
                        cs.replace(prev, &token.text, "");
                    },
                );
            }
        }

        match tokens.tokens().get(index + 1) {
            Some(next) if next.kind == TokenKind::Whitespace => {
                if next.contains_newline() {
                    ctx.add_error(
                        index,
                        "AfterNewline",
                        "Expected 1 space after colon in style definition; newline found",
                    );
                } else if next.text != " " {
                    let message = format!(
                        "Expected 1 space after colon in style definition; {} found",
                        next.text.chars().count()
                    );
                    ctx.add_fixable_error(index, "After", message, |cs| {
                        cs.replace(index + 1, &next.text, " ");
                    });
                }
            }
            Some(_) => {
                ctx.add_fixable_error(
                    index,
                    "NoneAfter",
                    "Expected 1 space after colon in style definition; 0 found",
                    |cs| {
                        cs.insert_after(index, " ");
                    },
                );
            }
            None => {}
        }
        SniffFlow::Continue
    }
}

/// A declaration colon ends at `;` or `}`; a selector colon (`a:hover`)
/// reaches a `{` first.
fn in_declaration(tokens: &AnnotatedTokens, colon: usize) -> bool {
    for i in colon + 1..tokens.len() {
        match tokens.kind(i) {
            TokenKind::Semicolon | TokenKind::CloseCurlyBracket => return true,
            TokenKind::OpenCurlyBracket => return false,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use crate::sniffs::testing::{check, codes, fixed, only};
    use crate::tokens::Dialect;

    const RULE: &str = "Squiz.CSS.ColonSpacing";

    #[test]
    fn test_selectors_are_skipped() {
        let ruleset = only(RULE);
        let source = "a:hover, li:first-child {\n    color: red;\n    margin: 0 }\n";
        assert!(check(&ruleset, source, Dialect::Css).is_empty());
    }

    #[test]
    fn test_each_spacing_problem() {
        let ruleset = only(RULE);
        let source = "a {\n    color :red;\n    margin:   0;\n    padding:\n        0;\n}\n";
        let violations = check(&ruleset, source, Dialect::Css);
        assert_eq!(
            codes(&violations),
            vec![
                "Squiz.CSS.ColonSpacing.Before",
                "Squiz.CSS.ColonSpacing.NoneAfter",
                "Squiz.CSS.ColonSpacing.After",
                "Squiz.CSS.ColonSpacing.AfterNewline",
            ]
        );
        assert!(!violations[3].fixable);
        assert_eq!(
            violations[2].message,
            "Expected 1 space after colon in style definition; 3 found"
        );
    }

    #[test]
    fn test_fix() {
        let ruleset = only(RULE);
        let report = fixed(&ruleset, "a { color :red; margin:  0 }\n", Dialect::Css);
        assert_eq!(report.source, "a { color: red; margin: 0 }\n");
        assert!(report.outcome.is_converged());
    }

    #[test]
    fn test_php_colons_are_not_checked() {
        let ruleset = only(RULE);
        assert!(check(&ruleset, "<?php\n$a = $b ? $c : $d;\n", Dialect::Php).is_empty());
    }
}
