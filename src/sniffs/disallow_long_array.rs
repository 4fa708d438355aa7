use crate::sniff::{Sniff, SniffContext, SniffFlow};
use crate::tokens::{Dialect, TokenKind};

/// `array(...)` must be written as `[...]`.
pub struct DisallowLongArraySyntax;

impl Sniff for DisallowLongArraySyntax {
    fn code(&self) -> &'static str {
        "Generic.Arrays.DisallowLongArraySyntax"
    }

    fn description(&self) -> &'static str {
        "Short array syntax must be used to define arrays"
    }

    fn register(&self) -> &'static [TokenKind] {
        &[TokenKind::Array]
    }

    fn dialects(&self) -> &'static [Dialect] {
        &[Dialect::Php]
    }

    fn process(&self, ctx: &mut SniffContext<'_>, index: usize) -> SniffFlow {
        let tokens = ctx.tokens();
        let ann = tokens.annotation(index);
        // Type declarations (`array $a`) have no parenthesis.
        let (Some(opener), Some(closer)) = (ann.parenthesis_opener, ann.parenthesis_closer) else {
            return SniffFlow::Continue;
        };
        if tokens.annotation(opener).parenthesis_owner != Some(index) {
            return SniffFlow::Continue;
        }

        ctx.add_fixable_error(
            index,
            "Found",
            "Short array syntax must be used to define arrays",
            |cs| {
                cs.replace(index, tokens.text(index), "");
                for gap in index + 1..opener {
                    if tokens.token(gap).kind == TokenKind::Whitespace {
                        cs.replace(gap, tokens.text(gap), "");
                    }
                }
                cs.replace(opener, tokens.text(opener), "[");
                cs.replace(closer, tokens.text(closer), "]");
            },
        );
        SniffFlow::Continue
    }
}
