//! Interpolated strings, heredocs and template literals.
//!
//! Embedded expressions are re-scanned by a sub-scanner bounded to the
//! expression's byte range; its tokens are spliced into the outer stream
//! with their true positions.

use super::lexer::{ident_end, is_ident_char, is_ident_start, Scanner};
use super::{Dialect, TokenKind};

impl<'a> Scanner<'a> {
    /// `"..."`: a constant string unless it interpolates.
    pub(super) fn scan_double_quoted(&mut self) {
        let start = self.pos;
        let Some(close) = closing_quote(self.bytes(), start + 1, b'"') else {
            let end = self.src.len();
            self.emit(TokenKind::Malformed, end);
            return;
        };
        if !has_interpolation(&self.bytes()[start + 1..close]) {
            self.emit(TokenKind::ConstantString, close + 1);
            return;
        }
        self.emit(TokenKind::DoubleQuote, start + 1);
        self.scan_interpolated_body(close);
        self.emit(TokenKind::DoubleQuote, close + 1);
    }

    /// Shell-exec backticks: always delimited, since they are never constant.
    pub(super) fn scan_backtick(&mut self) {
        let start = self.pos;
        let Some(close) = closing_quote(self.bytes(), start + 1, b'`') else {
            let end = self.src.len();
            self.emit(TokenKind::Malformed, end);
            return;
        };
        self.emit(TokenKind::Backtick, start + 1);
        self.scan_interpolated_body(close);
        self.emit(TokenKind::Backtick, close + 1);
    }

    /// Split `src[pos..end]` into string content, simple variables and
    /// `{$...}` / `${...}` expressions.
    fn scan_interpolated_body(&mut self, end: usize) {
        let bytes = self.bytes();
        let mut i = self.pos;
        while i < end {
            match bytes[i] {
                b'\\' => i = (i + 2).min(end),
                b'$' if i + 1 < end && is_ident_start(bytes[i + 1], Dialect::Php) => {
                    self.flush_content(i);
                    let var_end = ident_end(&bytes[..end], i + 1, Dialect::Php);
                    self.emit(TokenKind::Variable, var_end);
                    if let Some(suffix_end) = simple_suffix_end(bytes, var_end, end) {
                        self.splice_code(suffix_end);
                    }
                    i = self.pos;
                }
                b'$' if i + 1 < end && bytes[i + 1] == b'{' => {
                    match matching_brace(bytes, i + 1, end) {
                        Some(close) => {
                            self.flush_content(i);
                            self.emit(TokenKind::InterpolationOpen, i + 2);
                            self.splice_code(close);
                            self.emit(TokenKind::InterpolationClose, close + 1);
                            i = self.pos;
                        }
                        None => i += 1,
                    }
                }
                b'{' if i + 1 < end && bytes[i + 1] == b'$' => match matching_brace(bytes, i, end) {
                    Some(close) => {
                        self.flush_content(i);
                        self.emit(TokenKind::InterpolationOpen, i + 1);
                        self.splice_code(close);
                        self.emit(TokenKind::InterpolationClose, close + 1);
                        i = self.pos;
                    }
                    None => i += 1,
                },
                _ => i += 1,
            }
        }
        self.flush_content(end);
    }

    fn flush_content(&mut self, upto: usize) {
        if upto > self.pos {
            self.emit(TokenKind::StringContent, upto);
        }
    }

    /// `<<<ID` heredoc or `<<<'ID'` nowdoc. Returns false when the header is
    /// not a valid heredoc header, leaving the input untouched.
    pub(super) fn try_scan_heredoc(&mut self) -> bool {
        let bytes = self.bytes();
        let mut i = self.pos + 3;
        while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
            i += 1;
        }
        let quote = match bytes.get(i) {
            Some(q @ (b'\'' | b'"')) => {
                i += 1;
                Some(*q)
            }
            _ => None,
        };
        if !bytes.get(i).is_some_and(|b| is_ident_start(*b, Dialect::Php)) {
            return false;
        }
        let label_start = i;
        i = ident_end(bytes, i, Dialect::Php);
        let label = &self.src[label_start..i];
        if let Some(q) = quote {
            if bytes.get(i) != Some(&q) {
                return false;
            }
            i += 1;
        }
        if bytes.get(i) == Some(&b'\r') {
            i += 1;
        }
        if bytes.get(i) != Some(&b'\n') {
            return false;
        }
        let header_end = i + 1;
        let nowdoc = quote == Some(b'\'');

        let Some((body_end, label_at)) = find_closing_label(bytes, header_end, label) else {
            let end = self.src.len();
            self.emit(TokenKind::Malformed, end);
            return true;
        };

        let (start_kind, end_kind) = if nowdoc {
            (TokenKind::NowdocStart, TokenKind::NowdocEnd)
        } else {
            (TokenKind::HeredocStart, TokenKind::HeredocEnd)
        };
        self.emit(start_kind, header_end);
        if nowdoc {
            self.flush_content(body_end);
        } else {
            self.scan_interpolated_body(body_end);
        }
        if label_at > self.pos {
            self.emit(TokenKind::Whitespace, label_at);
        }
        self.emit(end_kind, label_at + label.len());
        true
    }

    /// JS template literal with `${...}` substitutions.
    pub(super) fn scan_template(&mut self) {
        let start = self.pos;
        let Some(close) = template_end(self.bytes(), start + 1, self.src.len()) else {
            let end = self.src.len();
            self.emit(TokenKind::Malformed, end);
            return;
        };
        self.emit(TokenKind::Backtick, start + 1);
        let bytes = self.bytes();
        let mut i = self.pos;
        while i < close {
            match bytes[i] {
                b'\\' => i = (i + 2).min(close),
                b'$' if bytes.get(i + 1) == Some(&b'{') => match matching_brace(bytes, i + 1, close) {
                    Some(rb) => {
                        self.flush_content(i);
                        self.emit(TokenKind::InterpolationOpen, i + 2);
                        self.splice_code(rb);
                        self.emit(TokenKind::InterpolationClose, rb + 1);
                        i = self.pos;
                    }
                    None => i += 1,
                },
                _ => i += 1,
            }
        }
        self.flush_content(close);
        self.emit(TokenKind::Backtick, close + 1);
    }
}

/// Index of the unescaped `quote` at or after `from`. Inside `"` and
/// backticks, `{$...}` and `${...}` expressions are skipped whole, so a
/// quote nested in one does not end the string.
fn closing_quote(bytes: &[u8], from: usize, quote: u8) -> Option<usize> {
    let interpolates = quote != b'\'';
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return Some(i),
            b'{' if interpolates && bytes.get(i + 1) == Some(&b'$') => {
                i = matching_brace(bytes, i, bytes.len()).map_or(i + 1, |rb| rb + 1);
            }
            b'$' if interpolates && bytes.get(i + 1) == Some(&b'{') => {
                i = matching_brace(bytes, i + 1, bytes.len()).map_or(i + 1, |rb| rb + 1);
            }
            _ => i += 1,
        }
    }
    None
}

fn has_interpolation(body: &[u8]) -> bool {
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            b'\\' => i += 2,
            b'$' if body
                .get(i + 1)
                .is_some_and(|b| *b == b'{' || is_ident_start(*b, Dialect::Php)) =>
            {
                return true
            }
            b'{' if body.get(i + 1) == Some(&b'$') => return true,
            _ => i += 1,
        }
    }
    false
}

/// `$a[0]`, `$a[key]`, `$a[$k]` or `$a->prop` directly after a simple
/// interpolated variable.
fn simple_suffix_end(bytes: &[u8], from: usize, end: usize) -> Option<usize> {
    let slice = &bytes[..end];
    match slice.get(from)? {
        b'[' => {
            let close = from + 1 + slice[from + 1..].iter().position(|b| *b == b']')?;
            let inner = &slice[from + 1..close];
            let inner = inner.strip_prefix(b"$").unwrap_or(inner);
            let inner = inner.strip_prefix(b"-").unwrap_or(inner);
            let simple = !inner.is_empty()
                && inner.iter().all(|b| is_ident_char(*b, Dialect::Php));
            simple.then_some(close + 1)
        }
        b'-' if slice.get(from + 1) == Some(&b'>')
            && slice
                .get(from + 2)
                .is_some_and(|b| is_ident_start(*b, Dialect::Php)) =>
        {
            Some(ident_end(slice, from + 2, Dialect::Php))
        }
        b'?' if slice[from..].starts_with(b"?->")
            && slice
                .get(from + 3)
                .is_some_and(|b| is_ident_start(*b, Dialect::Php)) =>
        {
            Some(ident_end(slice, from + 3, Dialect::Php))
        }
        _ => None,
    }
}

/// Index of the `}` matching the `{` at `open`, skipping quoted strings.
fn matching_brace(bytes: &[u8], open: usize, end: usize) -> Option<usize> {
    let slice = &bytes[..end];
    let mut depth = 0usize;
    let mut i = open;
    while i < slice.len() {
        match slice[i] {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            q @ (b'\'' | b'"') => i = closing_quote(slice, i + 1, q)?,
            b'`' => i = template_end(slice, i + 1, end)?,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the closing backtick of a template whose body starts at `from`.
fn template_end(bytes: &[u8], from: usize, end: usize) -> Option<usize> {
    let slice = &bytes[..end];
    let mut i = from;
    while i < slice.len() {
        match slice[i] {
            b'\\' => i += 2,
            b'`' => return Some(i),
            b'$' if slice.get(i + 1) == Some(&b'{') => {
                i = matching_brace(slice, i + 1, end)? + 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Find the heredoc closing line: optional indentation then `label` not
/// followed by a name character. Returns (end of body, offset of label).
fn find_closing_label(bytes: &[u8], from: usize, label: &str) -> Option<(usize, usize)> {
    let mut line_start = from;
    loop {
        let mut j = line_start;
        while j < bytes.len() && matches!(bytes[j], b' ' | b'\t') {
            j += 1;
        }
        if bytes[j..].starts_with(label.as_bytes())
            && !bytes
                .get(j + label.len())
                .is_some_and(|b| is_ident_char(*b, Dialect::Php))
        {
            return Some((line_start, j));
        }
        let newline = bytes[line_start..].iter().position(|b| *b == b'\n')?;
        line_start += newline + 1;
    }
}
