use std::ops::Range;

use crate::annotate::AnnotatedTokens;
use crate::fixer::Changeset;
use crate::sniff::{PropertySpec, Sniff, SniffContext, SniffFlow};
use crate::tokens::{Dialect, TokenKind};

/// Spacing around control structure keywords, conditions and braces:
/// `if (x) {`, `} else {`, one statement per line after the brace.
pub struct ControlSignature;

impl Sniff for ControlSignature {
    fn code(&self) -> &'static str {
        "Squiz.ControlStructures.ControlSignature"
    }

    fn description(&self) -> &'static str {
        "Control structures must use one space around conditions and braces"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[
            TokenKind::If,
            TokenKind::Elseif,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::For,
            TokenKind::Foreach,
            TokenKind::Switch,
            TokenKind::Do,
            TokenKind::Try,
            TokenKind::Catch,
            TokenKind::Finally,
        ]
    }

    fn dialects(&self) -> &'static [Dialect] {
        &[Dialect::Php, Dialect::Js]
    }

    fn properties(&self) -> Vec<PropertySpec> {
        vec![PropertySpec::int(
            "indent",
            4,
            "Indent of a body moved onto its own line",
        )]
    }

    fn process(&self, ctx: &mut SniffContext<'_>, index: usize) -> SniffFlow {
        let tokens = ctx.tokens();
        let ann = tokens.annotation(index);
        let keyword = tokens.text(index).to_ascii_lowercase();

        // Space between the keyword and its condition.
        if let Some(opener) = ann.parenthesis_opener.filter(|&o| o > index) {
            if let Some(gap) = Gap::between(tokens, index, opener) {
                if !gap.is_single_space() {
                    let message = format!(
                        "Expected 1 space after {keyword} keyword; {} found",
                        gap.describe()
                    );
                    ctx.add_fixable_error(index, "SpaceAfterKeyword", message, |cs| {
                        gap.make_single_space(cs, tokens);
                    });
                }
            }
        }

        // A `}` that ends the previous branch stays on the same line.
        let continues_branch = match ann.kind {
            TokenKind::Else | TokenKind::Elseif | TokenKind::Catch | TokenKind::Finally => true,
            TokenKind::While => ann.scope_opener.is_none(),
            _ => false,
        };
        if continues_branch {
            if let Some(brace) = tokens.prev_significant(index).filter(|&p| closes_scope(tokens, p)) {
                if let Some(gap) = Gap::between(tokens, brace, index) {
                    if !gap.is_single_space() {
                        let message = format!(
                            "Expected 1 space after closing brace; {} found",
                            gap.describe()
                        );
                        ctx.add_fixable_error(index, "SpaceAfterCloseBrace", message, |cs| {
                            gap.make_single_space(cs, tokens);
                        });
                    }
                }
            }
        }

        let Some(opener) = ann.scope_opener.filter(|&o| tokens.text(o) == "{") else {
            return SniffFlow::Continue;
        };

        let before = ann.parenthesis_closer.filter(|&c| c < opener).unwrap_or(index);
        if let Some(gap) = Gap::between(tokens, before, opener) {
            if !gap.is_single_space() {
                let message = format!(
                    "Expected 1 space before opening brace; {} found",
                    gap.describe()
                );
                ctx.add_fixable_error(opener, "SpaceBeforeOpenBrace", message, |cs| {
                    gap.make_single_space(cs, tokens);
                });
            }
        }

        if body_starts_on_brace_line(tokens, opener) {
            let width = usize::try_from(ctx.properties().int("indent")).unwrap_or(0);
            let indent = " ".repeat(tokens.line_indent(index) + width);
            ctx.add_fixable_error(
                opener,
                "NewlineAfterOpenBrace",
                "Expected newline after opening brace",
                |cs| match tokens.tokens().get(opener + 1) {
                    Some(ws) if ws.kind == TokenKind::Whitespace => {
                        cs.replace(opener + 1, &ws.text, format!("\n{indent}"));
                    }
                    _ => {
                        cs.insert_after(opener, format!("\n{indent}"));
                    }
                },
            );
        }
        SniffFlow::Continue
    }
}

fn closes_scope(tokens: &AnnotatedTokens, index: usize) -> bool {
    let ann = tokens.annotation(index);
    ann.kind == TokenKind::CloseCurlyBracket && ann.scope_condition.is_some()
}

/// Whether a statement follows `{` on the same line.
fn body_starts_on_brace_line(tokens: &AnnotatedTokens, opener: usize) -> bool {
    let closer = tokens.annotation(opener).scope_closer;
    let Some(first) = tokens.next_significant(opener) else {
        return false;
    };
    if Some(first) == closer {
        return false;
    }
    for i in opener + 1..tokens.len() {
        let token = tokens.token(i);
        match token.kind {
            TokenKind::Whitespace if token.contains_newline() => return false,
            TokenKind::Whitespace => {}
            // A trailing comment may share the brace line.
            TokenKind::Comment | TokenKind::DocComment => return false,
            _ => return true,
        }
    }
    false
}

/// Whitespace-only run of tokens between two significant tokens.
struct Gap {
    range: Range<usize>,
    text: String,
}

impl Gap {
    /// `None` when anything but whitespace sits between `from` and `to`.
    fn between(tokens: &AnnotatedTokens, from: usize, to: usize) -> Option<Self> {
        let range = from + 1..to;
        let mut text = String::new();
        for i in range.clone() {
            let token = tokens.token(i);
            if token.kind != TokenKind::Whitespace {
                return None;
            }
            text.push_str(&token.text);
        }
        Some(Self { range, text })
    }

    fn is_single_space(&self) -> bool {
        self.text == " "
    }

    fn describe(&self) -> String {
        if self.text.contains('\n') {
            "newline".to_string()
        } else {
            self.text.chars().count().to_string()
        }
    }

    fn make_single_space(&self, cs: &mut Changeset, tokens: &AnnotatedTokens) {
        if self.range.is_empty() {
            cs.insert_before(self.range.end, " ");
            return;
        }
        for (n, i) in self.range.clone().enumerate() {
            cs.replace(i, tokens.text(i), if n == 0 { " " } else { "" });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::sniffs::testing::{check, codes, fixed, only};
    use crate::tokens::Dialect;

    const RULE: &str = "Squiz.ControlStructures.ControlSignature";

    #[test]
    fn test_clean_signatures() {
        let ruleset = only(RULE);
        let source = "<?php\nif ($a) {\n    foo();\n} elseif ($b) {\n    bar();\n} else {\n}\ntry {\n    x();\n} catch (E $e) { // why\n}\ndo {\n    y();\n} while ($c);\n";
        assert!(check(&ruleset, source, Dialect::Php).is_empty());
    }

    #[test]
    fn test_reports_each_problem() {
        let ruleset = only(RULE);
        let violations = check(&ruleset, "if(a)  {b();}\nelse{\n}\n", Dialect::Js);
        assert_eq!(
            codes(&violations),
            vec![
                "Squiz.ControlStructures.ControlSignature.SpaceAfterKeyword",
                "Squiz.ControlStructures.ControlSignature.SpaceBeforeOpenBrace",
                "Squiz.ControlStructures.ControlSignature.NewlineAfterOpenBrace",
                "Squiz.ControlStructures.ControlSignature.SpaceAfterCloseBrace",
                "Squiz.ControlStructures.ControlSignature.SpaceBeforeOpenBrace",
            ]
        );
        assert_eq!(violations[0].message, "Expected 1 space after if keyword; 0 found");
        assert_eq!(violations[1].message, "Expected 1 space before opening brace; 2 found");
        assert_eq!(violations[3].message, "Expected 1 space after closing brace; newline found");
    }

    #[test]
    fn test_else_if_in_js() {
        let ruleset = only(RULE);
        let source = "if (a) {\n    b();\n} else if (c) {\n    d();\n}\n";
        assert!(check(&ruleset, source, Dialect::Js).is_empty());
    }

    #[test]
    fn test_fix_signature() {
        let ruleset = only(RULE);
        let report = fixed(&ruleset, "<?php\nwhile($a){\n    $a--;\n}\n", Dialect::Php);
        assert_eq!(report.source, "<?php\nwhile ($a) {\n    $a--;\n}\n");
        let report = fixed(&ruleset, "<?php\n    if ($a) { $b = 1;\n    }\n", Dialect::Php);
        assert_eq!(report.source, "<?php\n    if ($a) {\n        $b = 1;\n    }\n");
    }
}
