use crate::sniff::{Sniff, SniffContext, SniffFlow};
use crate::tokens::TokenKind;

/// Lines must be indented with spaces.
pub struct DisallowTabIndent;

impl Sniff for DisallowTabIndent {
    fn code(&self) -> &'static str {
        "Generic.WhiteSpace.DisallowTabIndent"
    }

    fn description(&self) -> &'static str {
        "Spaces must be used to indent lines; tabs are not allowed"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[TokenKind::Whitespace]
    }

    fn process(&self, ctx: &mut SniffContext<'_>, index: usize) -> SniffFlow {
        let tokens = ctx.tokens();
        let token = tokens.token(index);
        if token.column != 1 || !token.text.contains('\t') {
            return SniffFlow::Continue;
        }
        // Heredoc closing indentation must match the body.
        if let Some(next) = tokens.tokens().get(index + 1) {
            if matches!(next.kind, TokenKind::HeredocEnd | TokenKind::NowdocEnd) {
                return SniffFlow::Continue;
            }
        }

        let tab_width = match ctx.tab_width() {
            0 => 4,
            width => width,
        };
        let replacement = expand_tabs(&token.text, tab_width);
        ctx.add_fixable_error(
            index,
            "TabsUsed",
            "Spaces must be used to indent lines; tabs are not allowed",
            |cs| {
                cs.replace(index, &token.text, replacement);
            },
        );
        SniffFlow::Continue
    }
}

/// Replace each tab with spaces up to the next tab stop.
fn expand_tabs(indent: &str, tab_width: usize) -> String {
    let mut out = String::with_capacity(indent.len() * tab_width);
    let mut column = 0;
    for c in indent.chars() {
        match c {
            '\t' => {
                let pad = tab_width - column % tab_width;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\r' | '\n' => out.push(c),
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}
