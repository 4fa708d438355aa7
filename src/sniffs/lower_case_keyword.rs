use crate::sniff::{Sniff, SniffContext, SniffFlow};
use crate::tokens::{Dialect, TokenKind};

/// PHP keywords must be written in lowercase.
pub struct LowerCaseKeyword;

const KEYWORDS: &[TokenKind] = &[
    TokenKind::Abstract,
    TokenKind::Array,
    TokenKind::As,
    TokenKind::Break,
    TokenKind::Case,
    TokenKind::Catch,
    TokenKind::Class,
    TokenKind::Clone,
    TokenKind::Const,
    TokenKind::Continue,
    TokenKind::Declare,
    TokenKind::Default,
    TokenKind::Do,
    TokenKind::Echo,
    TokenKind::Else,
    TokenKind::Elseif,
    TokenKind::Empty,
    TokenKind::Enddeclare,
    TokenKind::Endfor,
    TokenKind::Endforeach,
    TokenKind::Endif,
    TokenKind::Endswitch,
    TokenKind::Endwhile,
    TokenKind::Enum,
    TokenKind::Exit,
    TokenKind::Extends,
    TokenKind::Final,
    TokenKind::Finally,
    TokenKind::Fn,
    TokenKind::For,
    TokenKind::Foreach,
    TokenKind::Function,
    TokenKind::Global,
    TokenKind::If,
    TokenKind::Implements,
    TokenKind::Include,
    TokenKind::Instanceof,
    TokenKind::Interface,
    TokenKind::Isset,
    TokenKind::List,
    TokenKind::Match,
    TokenKind::Namespace,
    TokenKind::New,
    TokenKind::Print,
    TokenKind::Private,
    TokenKind::Protected,
    TokenKind::Public,
    TokenKind::Readonly,
    TokenKind::Return,
    TokenKind::Static,
    TokenKind::Switch,
    TokenKind::Throw,
    TokenKind::Trait,
    TokenKind::Try,
    TokenKind::Unset,
    TokenKind::Use,
    TokenKind::Var,
    TokenKind::While,
    TokenKind::Yield,
    TokenKind::Closure,
    TokenKind::AnonClass,
    TokenKind::EnumCase,
    TokenKind::LogicalOperator,
];

impl Sniff for LowerCaseKeyword {
    fn code(&self) -> &'static str {
        "Generic.PHP.LowerCaseKeyword"
    }

    fn description(&self) -> &'static str {
        "PHP keywords must be lowercase"
    }

    fn register(&self) -> &'static [TokenKind] {
        KEYWORDS
    }

    fn dialects(&self) -> &'static [Dialect] {
        &[Dialect::Php]
    }

    fn process(&self, ctx: &mut SniffContext<'_>, index: usize) -> SniffFlow {
        let text = ctx.tokens().text(index);
        // `&&`, `||` and `!` share the kind with `and`, `or`, `xor`.
        if !text.bytes().all(|b| b.is_ascii_alphabetic()) {
            return SniffFlow::Continue;
        }
        let expected = text.to_ascii_lowercase();
        if expected != text {
            let message = format!(
                "PHP keywords must be lowercase; expected \"{expected}\" but found \"{text}\""
            );
            ctx.add_fixable_error(index, "Found", message, |cs| {
                cs.replace(index, text, expected.as_str());
            });
        }
        SniffFlow::Continue
    }
}
