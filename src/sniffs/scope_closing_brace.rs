use crate::sniff::{Sniff, SniffContext, SniffFlow};
use crate::tokens::{Dialect, TokenKind};

use super::{set_indent, starts_line};

/// The closing brace of a scope sits on its own line, aligned with the
/// line that opened the scope.
pub struct ScopeClosingBrace;

impl Sniff for ScopeClosingBrace {
    fn code(&self) -> &'static str {
        "Squiz.WhiteSpace.ScopeClosingBrace"
    }

    fn description(&self) -> &'static str {
        "Closing braces must be on their own line, aligned with the scope owner"
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
            TokenKind::Declare,
            TokenKind::Match,
            TokenKind::Function,
            TokenKind::Closure,
            TokenKind::Class,
            TokenKind::AnonClass,
            TokenKind::Interface,
            TokenKind::Trait,
            TokenKind::Enum,
            TokenKind::Namespace,
        ]
    }

    fn dialects(&self) -> &'static [Dialect] {
        &[Dialect::Php, Dialect::Js]
    }

    fn process(&self, ctx: &mut SniffContext<'_>, index: usize) -> SniffFlow {
        let tokens = ctx.tokens();
        let ann = tokens.annotation(index);
        let (Some(opener), Some(closer)) = (ann.scope_opener, ann.scope_closer) else {
            return SniffFlow::Continue;
        };
        let closer_ann = tokens.annotation(closer);
        if tokens.text(opener) != "{"
            || closer_ann.kind != TokenKind::CloseCurlyBracket
            || closer_ann.unmatched
            || closer_ann.scope_condition != Some(index)
            || tokens.next_significant(opener) == Some(closer)
        {
            return SniffFlow::Continue;
        }

        let expected = tokens.line_indent(index);
        let content = (0..closer)
            .rev()
            .find(|&i| tokens.token(i).kind != TokenKind::Whitespace);
        let shares_line = content.is_some_and(|c| {
            let token = tokens.token(c);
            token.line + token.text.matches('\n').count() == tokens.token(closer).line
        });

        if shares_line {
            ctx.add_fixable_error(
                closer,
                "ContentBefore",
                "Closing brace must be on a line by itself",
                |cs| {
                    let line_break = format!("\n{}", " ".repeat(expected));
                    let prev = tokens.token(closer - 1);
                    if prev.kind == TokenKind::Whitespace {
                        cs.replace(closer - 1, &prev.text, line_break);
                    } else {
                        cs.insert_before(closer, line_break);
                    }
                },
            );
            return SniffFlow::Continue;
        }

        if starts_line(tokens, closer) {
            let found = tokens.token(closer).column - 1;
            if found != expected {
                let message = format!(
                    "Closing brace indented incorrectly; expected {expected} spaces, found {found}"
                );
                ctx.add_fixable_error(closer, "Indent", message, |cs| {
                    set_indent(cs, tokens, closer, expected);
                });
            }
        }
        SniffFlow::Continue
    }
}
