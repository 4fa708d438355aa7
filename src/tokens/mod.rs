//! Lexical layer: dialects, the shared token vocabulary, and the tokenizer.
//!
//! Every dialect lexes into the same [`TokenKind`] vocabulary so that the
//! annotator, the dispatcher and the sniffs never special-case the source
//! language unless they want to.

mod css;
mod lexer;
mod strings;

pub use lexer::{tokenize, tokenize_with, LexOptions};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Source language selecting the lexer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// C-family scripting language with inline HTML and `<?php` tags.
    Php,
    /// Embedded script dialect.
    Js,
    /// Stylesheet dialect.
    Css,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Php, Dialect::Js, Dialect::Css];

    /// Guess a dialect from a path using the default extension map.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "php" | "inc" | "phtml" => Some(Dialect::Php),
            "js" | "mjs" | "cjs" => Some(Dialect::Js),
            "css" => Some(Dialect::Css),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Php => "php",
            Dialect::Js => "js",
            Dialect::Css => "css",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "php" => Some(Dialect::Php),
            "js" | "javascript" => Some(Dialect::Js),
            "css" => Some(Dialect::Css),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lexical categories shared by all dialects.
///
/// A handful of kinds (`Closure`, `AnonClass`, `OpenShortArray`,
/// `CloseShortArray`, `EnumCase`) are never produced by the lexer; the
/// annotator assigns them as the resolved kind of an ambiguous token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    // Document structure
    InlineHtml,
    OpenTag,
    OpenTagWithEcho,
    CloseTag,
    Whitespace,
    Comment,
    DocComment,

    // Operands
    Variable,
    Dollar,
    Identifier,
    Number,
    ConstantString,
    DoubleQuote,
    Backtick,
    StringContent,
    InterpolationOpen,
    InterpolationClose,
    HeredocStart,
    HeredocEnd,
    NowdocStart,
    NowdocEnd,
    Regex,
    Cast,
    AtRule,
    Hash,
    Important,

    // Keywords
    Abstract,
    Array,
    As,
    Break,
    Case,
    Catch,
    Class,
    Clone,
    Const,
    Continue,
    Declare,
    Default,
    Do,
    Echo,
    Else,
    Elseif,
    Empty,
    Enddeclare,
    Endfor,
    Endforeach,
    Endif,
    Endswitch,
    Endwhile,
    Enum,
    Exit,
    Extends,
    False,
    Final,
    Finally,
    Fn,
    For,
    Foreach,
    Function,
    Global,
    If,
    Implements,
    Include,
    Instanceof,
    Interface,
    Isset,
    Let,
    List,
    Match,
    Namespace,
    New,
    Null,
    Print,
    Private,
    Protected,
    Public,
    Readonly,
    Return,
    Static,
    Switch,
    Throw,
    Trait,
    True,
    Try,
    Unset,
    Use,
    Var,
    While,
    Yield,

    // Resolved by the annotator
    Closure,
    AnonClass,
    EnumCase,
    OpenShortArray,
    CloseShortArray,

    // Punctuation
    OpenParenthesis,
    CloseParenthesis,
    OpenSquareBracket,
    CloseSquareBracket,
    OpenCurlyBracket,
    CloseCurlyBracket,
    Attribute,
    Semicolon,
    Comma,
    Colon,
    DoubleColon,
    ObjectOperator,
    NullsafeObjectOperator,
    DoubleArrow,
    Question,
    Coalesce,
    Ellipsis,
    Backslash,
    At,
    StringConcat,

    // Operators
    Equal,
    AssignmentOperator,
    ComparisonOperator,
    ArithmeticOperator,
    LogicalOperator,
    BitwiseOperator,
    IncDec,

    // Degraded input
    Malformed,
    Unknown,
}

impl TokenKind {
    /// Every kind, for sniffs that want to observe the whole stream.
    pub const ALL: &'static [TokenKind] = &[
        TokenKind::InlineHtml,
        TokenKind::OpenTag,
        TokenKind::OpenTagWithEcho,
        TokenKind::CloseTag,
        TokenKind::Whitespace,
        TokenKind::Comment,
        TokenKind::DocComment,
        TokenKind::Variable,
        TokenKind::Dollar,
        TokenKind::Identifier,
        TokenKind::Number,
        TokenKind::ConstantString,
        TokenKind::DoubleQuote,
        TokenKind::Backtick,
        TokenKind::StringContent,
        TokenKind::InterpolationOpen,
        TokenKind::InterpolationClose,
        TokenKind::HeredocStart,
        TokenKind::HeredocEnd,
        TokenKind::NowdocStart,
        TokenKind::NowdocEnd,
        TokenKind::Regex,
        TokenKind::Cast,
        TokenKind::AtRule,
        TokenKind::Hash,
        TokenKind::Important,
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
        TokenKind::False,
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
        TokenKind::Let,
        TokenKind::List,
        TokenKind::Match,
        TokenKind::Namespace,
        TokenKind::New,
        TokenKind::Null,
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
        TokenKind::True,
        TokenKind::Try,
        TokenKind::Unset,
        TokenKind::Use,
        TokenKind::Var,
        TokenKind::While,
        TokenKind::Yield,
        TokenKind::Closure,
        TokenKind::AnonClass,
        TokenKind::EnumCase,
        TokenKind::OpenShortArray,
        TokenKind::CloseShortArray,
        TokenKind::OpenParenthesis,
        TokenKind::CloseParenthesis,
        TokenKind::OpenSquareBracket,
        TokenKind::CloseSquareBracket,
        TokenKind::OpenCurlyBracket,
        TokenKind::CloseCurlyBracket,
        TokenKind::Attribute,
        TokenKind::Semicolon,
        TokenKind::Comma,
        TokenKind::Colon,
        TokenKind::DoubleColon,
        TokenKind::ObjectOperator,
        TokenKind::NullsafeObjectOperator,
        TokenKind::DoubleArrow,
        TokenKind::Question,
        TokenKind::Coalesce,
        TokenKind::Ellipsis,
        TokenKind::Backslash,
        TokenKind::At,
        TokenKind::StringConcat,
        TokenKind::Equal,
        TokenKind::AssignmentOperator,
        TokenKind::ComparisonOperator,
        TokenKind::ArithmeticOperator,
        TokenKind::LogicalOperator,
        TokenKind::BitwiseOperator,
        TokenKind::IncDec,
        TokenKind::Malformed,
        TokenKind::Unknown,
    ];

    /// Whitespace and comments: skipped when looking for the previous or
    /// next significant token.
    pub fn is_insignificant(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::DocComment)
    }

    /// Reserved words, for case normalisation rules.
    pub fn is_keyword(self) -> bool {
        (TokenKind::Abstract..=TokenKind::Yield).contains(&self)
    }

    /// Tokens after which a `[` indexes and a `/` divides.
    pub fn is_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Variable
                | TokenKind::Identifier
                | TokenKind::Number
                | TokenKind::ConstantString
                | TokenKind::DoubleQuote
                | TokenKind::Backtick
                | TokenKind::HeredocEnd
                | TokenKind::NowdocEnd
                | TokenKind::Regex
                | TokenKind::CloseParenthesis
                | TokenKind::CloseSquareBracket
                | TokenKind::CloseShortArray
                | TokenKind::InterpolationClose
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::IncDec
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One lexical token. Immutable once produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text of the token.
    pub text: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character, tabs expanded.
    pub column: usize,
    /// Byte offset of the first character in the source.
    pub offset: usize,
    /// Byte length of `text`.
    pub length: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn contains_newline(&self) -> bool {
        self.text.contains('\n')
    }
}

/// Rebuild the source text from a token sequence.
///
/// The lexer covers its input without gaps, so this is the identity on
/// lexed input.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.length).sum());
    for token in tokens {
        out.push_str(&token.text);
    }
    out
}
