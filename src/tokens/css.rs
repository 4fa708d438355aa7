use super::lexer::{ident_end, is_ident_start, Scanner};
use super::{Dialect, TokenKind};

impl<'a> Scanner<'a> {
    pub(super) fn scan_css(&mut self) {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let at = |i: usize| bytes.get(i).copied();
        match bytes[0] {
            b' ' | b'\t' | b'\r' | b'\n' | 0x0c => self.scan_whitespace(),
            b'/' if rest.starts_with("/*") => self.scan_block_comment(),
            b'\'' | b'"' => self.scan_quoted(bytes[0]),
            b'@' if at(1).is_some_and(is_name_start) => {
                let end = ident_end(self.bytes(), self.pos + 1, Dialect::Css);
                self.emit(TokenKind::AtRule, end);
            }
            b'#' if at(1).is_some_and(|b| b == b'-' || is_name_char(b)) => {
                let end = ident_end(self.bytes(), self.pos + 1, Dialect::Css);
                self.emit(TokenKind::Hash, end);
            }
            b'0'..=b'9' => self.scan_dimension(),
            b'.' | b'+' | b'-' if at(1).is_some_and(|b| b.is_ascii_digit()) => self.scan_dimension(),
            b'-' if at(1).is_some_and(|b| b == b'-' || is_name_start(b)) => {
                let end = ident_end(self.bytes(), self.pos + 1, Dialect::Css);
                self.emit(TokenKind::Identifier, end);
            }
            b'.' if at(1).is_some_and(|b| b == b'-' || is_name_start(b)) => {
                let end = ident_end(self.bytes(), self.pos + 1, Dialect::Css);
                self.emit(TokenKind::Identifier, end);
            }
            b'!' => {
                let after = rest[1..].trim_start_matches([' ', '\t']);
                let skipped = rest.len() - 1 - after.len();
                if after.len() >= 9 && after.as_bytes()[..9].eq_ignore_ascii_case(b"important") {
                    let end = self.pos + 1 + skipped + 9;
                    self.emit(TokenKind::Important, end);
                } else {
                    self.scan_operator(CSS_PUNCTUATION);
                }
            }
            b if is_name_start(b) => {
                let end = ident_end(self.bytes(), self.pos, Dialect::Css);
                self.emit(TokenKind::Identifier, end);
            }
            _ => self.scan_operator(CSS_PUNCTUATION),
        }
    }

    /// Number with an optional unit or percent sign: `10px`, `-.5em`, `50%`.
    fn scan_dimension(&mut self) {
        let bytes = self.bytes();
        let mut i = self.pos;
        if matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        if i < bytes.len() && bytes[i] == b'%' {
            i += 1;
        } else {
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
        }
        self.emit(TokenKind::Number, i);
    }
}

fn is_name_start(b: u8) -> bool {
    is_ident_start(b, Dialect::Css)
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit()
}

const CSS_PUNCTUATION: &[(&str, TokenKind)] = &[
    ("::", TokenKind::DoubleColon),
    ("~=", TokenKind::ComparisonOperator),
    ("|=", TokenKind::ComparisonOperator),
    ("^=", TokenKind::ComparisonOperator),
    ("$=", TokenKind::ComparisonOperator),
    ("*=", TokenKind::ComparisonOperator),
    ("{", TokenKind::OpenCurlyBracket),
    ("}", TokenKind::CloseCurlyBracket),
    ("(", TokenKind::OpenParenthesis),
    (")", TokenKind::CloseParenthesis),
    ("[", TokenKind::OpenSquareBracket),
    ("]", TokenKind::CloseSquareBracket),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (">", TokenKind::ComparisonOperator),
    ("+", TokenKind::ArithmeticOperator),
    ("-", TokenKind::ArithmeticOperator),
    ("*", TokenKind::ArithmeticOperator),
    ("/", TokenKind::ArithmeticOperator),
    ("~", TokenKind::BitwiseOperator),
    ("&", TokenKind::BitwiseOperator),
    ("=", TokenKind::Equal),
    ("!", TokenKind::LogicalOperator),
];
