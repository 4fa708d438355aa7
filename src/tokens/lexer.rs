//! Byte-oriented scanner shared by the PHP and JS dialects.
//!
//! The scanner covers its input without gaps or overlaps and has no reject
//! state: bytes it does not understand become `Unknown` tokens and
//! unterminated constructs become a single `Malformed` token.

use super::{Dialect, Token, TokenKind};

/// Options for a tokenizer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexOptions {
    pub dialect: Dialect,
    /// Width used to expand tabs when computing columns; 0 counts a tab as
    /// one column.
    pub tab_width: usize,
}

impl LexOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tab_width: 4,
        }
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }
}

/// Tokenize `source` with default options for `dialect`.
pub fn tokenize(source: &str, dialect: Dialect) -> Vec<Token> {
    tokenize_with(source, LexOptions::new(dialect))
}

/// Tokenize `source`. Never fails.
pub fn tokenize_with(source: &str, options: LexOptions) -> Vec<Token> {
    let mode = match options.dialect {
        Dialect::Php => Mode::Html,
        Dialect::Js | Dialect::Css => Mode::Code,
    };
    let mut scanner = Scanner::new(source, options, mode);
    scanner.run();
    scanner.tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Mode {
    Html,
    Code,
}

pub(super) struct Scanner<'a> {
    /// Source truncated to the scan bound; offsets stay absolute.
    pub(super) src: &'a str,
    pub(super) pos: usize,
    line: usize,
    column: usize,
    pub(super) options: LexOptions,
    mode: Mode,
    pub(super) tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str, options: LexOptions, mode: Mode) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            options,
            mode,
            tokens: Vec::new(),
        }
    }

    /// A scanner over `src[start..end]` in code mode, reporting positions as
    /// if it were running inside the enclosing scan.
    pub(super) fn bounded(
        src: &'a str,
        start: usize,
        end: usize,
        line: usize,
        column: usize,
        options: LexOptions,
    ) -> Self {
        Self {
            src: &src[..end],
            pos: start,
            line,
            column,
            options,
            mode: Mode::Code,
            tokens: Vec::new(),
        }
    }

    pub(super) fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    pub(super) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Emit `src[pos..end]` as one token and move past it.
    pub(super) fn emit(&mut self, kind: TokenKind, end: usize) {
        debug_assert!(end > self.pos && end <= self.src.len());
        let text = &self.src[self.pos..end];
        self.tokens.push(Token {
            kind,
            text: text.to_string(),
            line: self.line,
            column: self.column,
            offset: self.pos,
            length: end - self.pos,
        });
        advance(&mut self.line, &mut self.column, text, self.options.tab_width);
        self.pos = end;
    }

    /// Re-scan `src[pos..end]` as code with a bounded sub-scanner and splice
    /// its tokens into this stream.
    pub(super) fn splice_code(&mut self, end: usize) {
        if end <= self.pos {
            return;
        }
        let mut sub = Scanner::bounded(
            self.src,
            self.pos,
            end,
            self.line,
            self.column,
            self.options,
        );
        sub.run();
        self.tokens.append(&mut sub.tokens);
        self.pos = sub.pos;
        self.line = sub.line;
        self.column = sub.column;
    }

    pub(super) fn prev_significant_kind(&self) -> Option<TokenKind> {
        self.tokens
            .iter()
            .rev()
            .map(|t| t.kind)
            .find(|k| !k.is_insignificant())
    }

    pub(super) fn run(&mut self) {
        while self.pos < self.src.len() {
            let before = self.pos;
            match (self.options.dialect, self.mode) {
                (Dialect::Php, Mode::Html) => self.scan_html(),
                (Dialect::Php, Mode::Code) => self.scan_php(),
                (Dialect::Js, _) => self.scan_js(),
                (Dialect::Css, _) => self.scan_css(),
            }
            if self.pos == before {
                // Never stall: swallow one character.
                let end = self.pos + char_len(self.rest());
                self.emit(TokenKind::Unknown, end);
            }
        }
    }

    fn scan_html(&mut self) {
        match find_open_tag(self.rest()) {
            Some(0) => self.scan_open_tag(),
            Some(n) => {
                let end = self.pos + n;
                self.emit(TokenKind::InlineHtml, end);
            }
            None => {
                let end = self.src.len();
                self.emit(TokenKind::InlineHtml, end);
            }
        }
    }

    fn scan_open_tag(&mut self) {
        let rest = self.rest();
        let (kind, mut len) = if rest.starts_with("<?=") {
            (TokenKind::OpenTagWithEcho, 3)
        } else if rest.len() >= 5 && rest.as_bytes()[2..5].eq_ignore_ascii_case(b"php") {
            (TokenKind::OpenTag, 5)
        } else {
            (TokenKind::OpenTag, 2)
        };
        // The tag owns exactly one following whitespace character.
        if kind == TokenKind::OpenTag {
            len += match newline_len(&rest[len..]) {
                0 if matches!(rest.as_bytes().get(len), Some(b' ' | b'\t')) => 1,
                n => n,
            };
        }
        let end = self.pos + len;
        self.emit(kind, end);
        self.mode = Mode::Code;
    }

    fn scan_php(&mut self) {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let b = bytes[0];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' | 0x0c => self.scan_whitespace(),
            b'?' if rest.starts_with("?>") => {
                let len = 2 + newline_len(&rest[2..]);
                let end = self.pos + len;
                self.emit(TokenKind::CloseTag, end);
                self.mode = Mode::Html;
            }
            b'#' if rest.starts_with("#[") => {
                let end = self.pos + 2;
                self.emit(TokenKind::Attribute, end);
            }
            b'#' => self.scan_line_comment(true),
            b'/' if rest.starts_with("//") => self.scan_line_comment(true),
            b'/' if rest.starts_with("/*") => self.scan_block_comment(),
            b'$' => {
                let end = if bytes.len() > 1 && is_ident_start(bytes[1], Dialect::Php) {
                    ident_end(self.bytes(), self.pos + 1, Dialect::Php)
                } else {
                    self.pos + 1
                };
                let kind = if end > self.pos + 1 {
                    TokenKind::Variable
                } else {
                    TokenKind::Dollar
                };
                self.emit(kind, end);
            }
            b'\'' => self.scan_quoted(b'\''),
            b'"' => self.scan_double_quoted(),
            b'`' => self.scan_backtick(),
            b'<' if rest.starts_with("<<<") => {
                if !self.try_scan_heredoc() {
                    self.scan_operator(PHP_OPERATORS);
                }
            }
            b'(' => match cast_len(rest) {
                Some(len) => {
                    let end = self.pos + len;
                    self.emit(TokenKind::Cast, end);
                }
                None => {
                    let end = self.pos + 1;
                    self.emit(TokenKind::OpenParenthesis, end);
                }
            },
            b'0'..=b'9' => self.scan_number(),
            b'.' if bytes.get(1).is_some_and(u8::is_ascii_digit) => self.scan_number(),
            c if is_ident_start(c, Dialect::Php) => self.scan_word(),
            _ => self.scan_operator(PHP_OPERATORS),
        }
    }

    fn scan_js(&mut self) {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        match bytes[0] {
            b' ' | b'\t' | b'\r' | b'\n' | 0x0c => self.scan_whitespace(),
            b'/' if rest.starts_with("//") => self.scan_line_comment(false),
            b'/' if rest.starts_with("/*") => self.scan_block_comment(),
            b'/' if !self.prev_significant_kind().is_some_and(TokenKind::is_operand) => {
                match regex_len(bytes) {
                    Some(len) => {
                        let end = self.pos + len;
                        self.emit(TokenKind::Regex, end);
                    }
                    None => self.scan_operator(JS_OPERATORS),
                }
            }
            b'\'' => self.scan_quoted(b'\''),
            b'"' => self.scan_quoted(b'"'),
            b'`' => self.scan_template(),
            b'0'..=b'9' => self.scan_number(),
            b'.' if bytes.get(1).is_some_and(u8::is_ascii_digit) => self.scan_number(),
            b'#' if bytes.len() > 1 && is_ident_start(bytes[1], Dialect::Js) => {
                let end = ident_end(self.bytes(), self.pos + 1, Dialect::Js);
                self.emit(TokenKind::Identifier, end);
            }
            c if is_ident_start(c, Dialect::Js) => self.scan_word(),
            _ => self.scan_operator(JS_OPERATORS),
        }
    }

    /// Horizontal whitespace up to and including at most one newline.
    pub(super) fn scan_whitespace(&mut self) {
        let bytes = self.bytes();
        let mut i = self.pos;
        while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\r' | 0x0c) {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'\n' {
            i += 1;
        }
        self.emit(TokenKind::Whitespace, i);
    }

    fn scan_line_comment(&mut self, stop_at_close_tag: bool) {
        let rest = self.rest();
        let mut len = rest.find('\n').unwrap_or(rest.len());
        if stop_at_close_tag {
            if let Some(close) = rest[..len].find("?>") {
                len = close;
            }
        }
        // `\r\n` line endings: leave the `\r` to the whitespace token.
        if len > 0 && rest.as_bytes()[len - 1] == b'\r' && len < rest.len() {
            len -= 1;
        }
        let end = self.pos + len.max(1);
        self.emit(TokenKind::Comment, end);
    }

    pub(super) fn scan_block_comment(&mut self) {
        let rest = self.rest();
        match rest[2..].find("*/") {
            Some(close) => {
                let len = close + 4;
                let kind = if rest.starts_with("/**") && len > 4 {
                    TokenKind::DocComment
                } else {
                    TokenKind::Comment
                };
                let end = self.pos + len;
                self.emit(kind, end);
            }
            None => {
                let end = self.src.len();
                self.emit(TokenKind::Malformed, end);
            }
        }
    }

    /// Single-quoted PHP strings and JS/CSS strings.
    pub(super) fn scan_quoted(&mut self, quote: u8) {
        let bytes = self.bytes();
        let mut i = self.pos + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                c if c == quote => {
                    self.emit(TokenKind::ConstantString, i + 1);
                    return;
                }
                _ => i += 1,
            }
        }
        let end = i.min(bytes.len());
        self.emit(TokenKind::Malformed, end);
    }

    pub(super) fn scan_number(&mut self) {
        let len = number_len(self.rest().as_bytes(), self.options.dialect);
        let end = self.pos + len;
        self.emit(TokenKind::Number, end);
    }

    fn scan_word(&mut self) {
        let dialect = self.options.dialect;
        let end = ident_end(self.bytes(), self.pos, dialect);
        let word = &self.src[self.pos..end];
        let member_name = matches!(
            self.prev_significant_kind(),
            Some(
                TokenKind::ObjectOperator
                    | TokenKind::NullsafeObjectOperator
                    | TokenKind::DoubleColon
                    | TokenKind::Function
            )
        );
        let kind = if member_name {
            TokenKind::Identifier
        } else {
            match dialect {
                Dialect::Php => php_keyword(word).unwrap_or(TokenKind::Identifier),
                Dialect::Js => js_keyword(word).unwrap_or(TokenKind::Identifier),
                Dialect::Css => TokenKind::Identifier,
            }
        };
        // `enum` is only a keyword when it introduces a declaration.
        let kind = if kind == TokenKind::Enum && !self.followed_by_name(end) {
            TokenKind::Identifier
        } else {
            kind
        };
        self.emit(kind, end);
    }

    fn followed_by_name(&self, from: usize) -> bool {
        let bytes = self.bytes();
        let mut i = from;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i > from && i < bytes.len() && is_ident_start(bytes[i], self.options.dialect)
    }

    pub(super) fn scan_operator(&mut self, table: &[(&str, TokenKind)]) {
        let rest = self.rest();
        for (text, kind) in table {
            if rest.starts_with(text) {
                // `a?.5:b` is a ternary, not optional chaining.
                if *text == "?." && rest.as_bytes().get(2).is_some_and(u8::is_ascii_digit) {
                    continue;
                }
                let end = self.pos + text.len();
                self.emit(*kind, end);
                return;
            }
        }
        let end = self.pos + char_len(rest);
        self.emit(TokenKind::Unknown, end);
    }
}

pub(super) fn advance(line: &mut usize, column: &mut usize, text: &str, tab_width: usize) {
    for ch in text.chars() {
        match ch {
            '\n' => {
                *line += 1;
                *column = 1;
            }
            '\t' if tab_width > 0 => *column += tab_width - ((*column - 1) % tab_width),
            _ => *column += 1,
        }
    }
}

pub(super) fn char_len(s: &str) -> usize {
    s.chars().next().map_or(1, char::len_utf8)
}

fn newline_len(s: &str) -> usize {
    if s.starts_with("\r\n") {
        2
    } else if s.starts_with('\n') {
        1
    } else {
        0
    }
}

/// Offset of the next real open tag. `<?` followed by a name other than
/// `php` (e.g. `<?xml`) stays inline HTML.
fn find_open_tag(s: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = s[from..].find("<?") {
        let at = from + found;
        let after = &s[at + 2..];
        let valid = after.starts_with('=')
            || (after.len() >= 3 && after.as_bytes()[..3].eq_ignore_ascii_case(b"php"))
            || after.is_empty()
            || after.starts_with(|c: char| c.is_ascii_whitespace());
        if valid {
            return Some(at);
        }
        from = at + 2;
    }
    None
}

pub(super) fn is_ident_start(b: u8, dialect: Dialect) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80 || (dialect == Dialect::Js && b == b'$')
}

pub(super) fn is_ident_char(b: u8, dialect: Dialect) -> bool {
    is_ident_start(b, dialect)
        || b.is_ascii_digit()
        || (dialect == Dialect::Css && b == b'-')
}

pub(super) fn ident_end(bytes: &[u8], from: usize, dialect: Dialect) -> usize {
    let mut i = from;
    while i < bytes.len() && is_ident_char(bytes[i], dialect) {
        i += 1;
    }
    i
}

fn number_len(bytes: &[u8], dialect: Dialect) -> usize {
    let radix_digits = |i: usize, pred: fn(&u8) -> bool| {
        let mut j = i;
        while j < bytes.len() && (pred(&bytes[j]) || bytes[j] == b'_') {
            j += 1;
        }
        j
    };
    let mut i = if bytes.len() > 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => radix_digits(2, u8::is_ascii_hexdigit),
            b'b' | b'B' => radix_digits(2, |b: &u8| matches!(*b, b'0' | b'1')),
            b'o' | b'O' => radix_digits(2, |b: &u8| matches!(*b, b'0'..=b'7')),
            _ => 0,
        }
    } else {
        0
    };
    if i == 0 {
        i = radix_digits(0, u8::is_ascii_digit);
        if i < bytes.len() && bytes[i] == b'.' && bytes.get(i + 1) != Some(&b'.') {
            i = radix_digits(i + 1, u8::is_ascii_digit);
        }
        if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
            let mut j = i + 1;
            if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
                j += 1;
            }
            if j < bytes.len() && bytes[j].is_ascii_digit() {
                i = radix_digits(j, u8::is_ascii_digit);
            }
        }
    }
    if dialect == Dialect::Js && bytes.get(i) == Some(&b'n') {
        i += 1;
    }
    i.max(1)
}

/// Length of a `(type)` cast at the start of `s`.
fn cast_len(s: &str) -> Option<usize> {
    const CASTS: &[&str] = &[
        "int", "integer", "bool", "boolean", "float", "double", "real", "string", "array",
        "object", "unset", "binary",
    ];
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    let word_start = i;
    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        i += 1;
    }
    let word = s[word_start..i].to_ascii_lowercase();
    if !CASTS.contains(&word.as_str()) {
        return None;
    }
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    (bytes.get(i) == Some(&b')')).then_some(i + 1)
}

/// Length of a JS regex literal at the start of `bytes`, flags included.
fn regex_len(bytes: &[u8]) -> Option<usize> {
    let mut i = 1;
    let mut in_class = false;
    loop {
        match bytes.get(i)? {
            b'\\' => i += 2,
            b'\n' => return None,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => break,
            _ => i += 1,
        }
    }
    // `//` was already taken as a comment; an empty body is not a regex.
    if i == 1 {
        return None;
    }
    i += 1;
    while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        i += 1;
    }
    Some(i)
}

fn php_keyword(word: &str) -> Option<TokenKind> {
    use TokenKind as K;
    let lower = word.to_ascii_lowercase();
    let kind = match lower.as_str() {
        "abstract" => K::Abstract,
        "array" => K::Array,
        "as" => K::As,
        "break" => K::Break,
        "case" => K::Case,
        "catch" => K::Catch,
        "class" => K::Class,
        "clone" => K::Clone,
        "const" => K::Const,
        "continue" => K::Continue,
        "declare" => K::Declare,
        "default" => K::Default,
        "do" => K::Do,
        "echo" => K::Echo,
        "else" => K::Else,
        "elseif" => K::Elseif,
        "empty" => K::Empty,
        "enddeclare" => K::Enddeclare,
        "endfor" => K::Endfor,
        "endforeach" => K::Endforeach,
        "endif" => K::Endif,
        "endswitch" => K::Endswitch,
        "endwhile" => K::Endwhile,
        "enum" => K::Enum,
        "exit" | "die" => K::Exit,
        "extends" => K::Extends,
        "false" => K::False,
        "final" => K::Final,
        "finally" => K::Finally,
        "fn" => K::Fn,
        "for" => K::For,
        "foreach" => K::Foreach,
        "function" => K::Function,
        "global" => K::Global,
        "if" => K::If,
        "implements" => K::Implements,
        "include" | "include_once" | "require" | "require_once" => K::Include,
        "instanceof" => K::Instanceof,
        "interface" => K::Interface,
        "isset" => K::Isset,
        "list" => K::List,
        "match" => K::Match,
        "namespace" => K::Namespace,
        "new" => K::New,
        "null" => K::Null,
        "print" => K::Print,
        "private" => K::Private,
        "protected" => K::Protected,
        "public" => K::Public,
        "readonly" => K::Readonly,
        "return" => K::Return,
        "static" => K::Static,
        "switch" => K::Switch,
        "throw" => K::Throw,
        "trait" => K::Trait,
        "true" => K::True,
        "try" => K::Try,
        "unset" => K::Unset,
        "use" => K::Use,
        "var" => K::Var,
        "while" => K::While,
        "yield" => K::Yield,
        "and" | "or" | "xor" => K::LogicalOperator,
        _ => return None,
    };
    Some(kind)
}

fn js_keyword(word: &str) -> Option<TokenKind> {
    use TokenKind as K;
    let kind = match word {
        "break" => K::Break,
        "case" => K::Case,
        "catch" => K::Catch,
        "class" => K::Class,
        "const" => K::Const,
        "continue" => K::Continue,
        "default" => K::Default,
        "do" => K::Do,
        "else" => K::Else,
        "extends" => K::Extends,
        "false" => K::False,
        "finally" => K::Finally,
        "for" => K::For,
        "function" => K::Function,
        "if" => K::If,
        "instanceof" => K::Instanceof,
        "let" => K::Let,
        "new" => K::New,
        "null" => K::Null,
        "return" => K::Return,
        "static" => K::Static,
        "switch" => K::Switch,
        "throw" => K::Throw,
        "true" => K::True,
        "try" => K::Try,
        "var" => K::Var,
        "while" => K::While,
        "yield" => K::Yield,
        _ => return None,
    };
    Some(kind)
}

/// Longest match first.
const PHP_OPERATORS: &[(&str, TokenKind)] = &[
    ("<<=", TokenKind::AssignmentOperator),
    (">>=", TokenKind::AssignmentOperator),
    ("**=", TokenKind::AssignmentOperator),
    ("??=", TokenKind::AssignmentOperator),
    ("...", TokenKind::Ellipsis),
    ("===", TokenKind::ComparisonOperator),
    ("!==", TokenKind::ComparisonOperator),
    ("<=>", TokenKind::ComparisonOperator),
    ("?->", TokenKind::NullsafeObjectOperator),
    ("==", TokenKind::ComparisonOperator),
    ("!=", TokenKind::ComparisonOperator),
    ("<>", TokenKind::ComparisonOperator),
    ("<=", TokenKind::ComparisonOperator),
    (">=", TokenKind::ComparisonOperator),
    ("&&", TokenKind::LogicalOperator),
    ("||", TokenKind::LogicalOperator),
    ("??", TokenKind::Coalesce),
    ("->", TokenKind::ObjectOperator),
    ("=>", TokenKind::DoubleArrow),
    ("::", TokenKind::DoubleColon),
    ("++", TokenKind::IncDec),
    ("--", TokenKind::IncDec),
    ("+=", TokenKind::AssignmentOperator),
    ("-=", TokenKind::AssignmentOperator),
    ("*=", TokenKind::AssignmentOperator),
    ("/=", TokenKind::AssignmentOperator),
    (".=", TokenKind::AssignmentOperator),
    ("%=", TokenKind::AssignmentOperator),
    ("&=", TokenKind::AssignmentOperator),
    ("|=", TokenKind::AssignmentOperator),
    ("^=", TokenKind::AssignmentOperator),
    ("**", TokenKind::ArithmeticOperator),
    ("<<", TokenKind::BitwiseOperator),
    (">>", TokenKind::BitwiseOperator),
    ("+", TokenKind::ArithmeticOperator),
    ("-", TokenKind::ArithmeticOperator),
    ("*", TokenKind::ArithmeticOperator),
    ("/", TokenKind::ArithmeticOperator),
    ("%", TokenKind::ArithmeticOperator),
    ("=", TokenKind::Equal),
    ("<", TokenKind::ComparisonOperator),
    (">", TokenKind::ComparisonOperator),
    ("!", TokenKind::LogicalOperator),
    (".", TokenKind::StringConcat),
    ("&", TokenKind::BitwiseOperator),
    ("|", TokenKind::BitwiseOperator),
    ("^", TokenKind::BitwiseOperator),
    ("~", TokenKind::BitwiseOperator),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    ("@", TokenKind::At),
    ("\\", TokenKind::Backslash),
    ("(", TokenKind::OpenParenthesis),
    (")", TokenKind::CloseParenthesis),
    ("[", TokenKind::OpenSquareBracket),
    ("]", TokenKind::CloseSquareBracket),
    ("{", TokenKind::OpenCurlyBracket),
    ("}", TokenKind::CloseCurlyBracket),
];

const JS_OPERATORS: &[(&str, TokenKind)] = &[
    (">>>=", TokenKind::AssignmentOperator),
    ("===", TokenKind::ComparisonOperator),
    ("!==", TokenKind::ComparisonOperator),
    (">>>", TokenKind::BitwiseOperator),
    ("**=", TokenKind::AssignmentOperator),
    ("<<=", TokenKind::AssignmentOperator),
    (">>=", TokenKind::AssignmentOperator),
    ("&&=", TokenKind::AssignmentOperator),
    ("||=", TokenKind::AssignmentOperator),
    ("??=", TokenKind::AssignmentOperator),
    ("...", TokenKind::Ellipsis),
    ("?.", TokenKind::NullsafeObjectOperator),
    ("=>", TokenKind::DoubleArrow),
    ("==", TokenKind::ComparisonOperator),
    ("!=", TokenKind::ComparisonOperator),
    ("<=", TokenKind::ComparisonOperator),
    (">=", TokenKind::ComparisonOperator),
    ("&&", TokenKind::LogicalOperator),
    ("||", TokenKind::LogicalOperator),
    ("??", TokenKind::Coalesce),
    ("++", TokenKind::IncDec),
    ("--", TokenKind::IncDec),
    ("+=", TokenKind::AssignmentOperator),
    ("-=", TokenKind::AssignmentOperator),
    ("*=", TokenKind::AssignmentOperator),
    ("/=", TokenKind::AssignmentOperator),
    ("%=", TokenKind::AssignmentOperator),
    ("&=", TokenKind::AssignmentOperator),
    ("|=", TokenKind::AssignmentOperator),
    ("^=", TokenKind::AssignmentOperator),
    ("**", TokenKind::ArithmeticOperator),
    ("<<", TokenKind::BitwiseOperator),
    (">>", TokenKind::BitwiseOperator),
    ("+", TokenKind::ArithmeticOperator),
    ("-", TokenKind::ArithmeticOperator),
    ("*", TokenKind::ArithmeticOperator),
    ("/", TokenKind::ArithmeticOperator),
    ("%", TokenKind::ArithmeticOperator),
    ("=", TokenKind::Equal),
    ("<", TokenKind::ComparisonOperator),
    (">", TokenKind::ComparisonOperator),
    ("!", TokenKind::LogicalOperator),
    (".", TokenKind::ObjectOperator),
    ("&", TokenKind::BitwiseOperator),
    ("|", TokenKind::BitwiseOperator),
    ("^", TokenKind::BitwiseOperator),
    ("~", TokenKind::BitwiseOperator),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    ("@", TokenKind::At),
    ("(", TokenKind::OpenParenthesis),
    (")", TokenKind::CloseParenthesis),
    ("[", TokenKind::OpenSquareBracket),
    ("]", TokenKind::CloseSquareBracket),
    ("{", TokenKind::OpenCurlyBracket),
    ("}", TokenKind::CloseCurlyBracket),
];
