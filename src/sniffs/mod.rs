//! Built-in sniffs.
//!
//! A deliberately small set that exercises every engine path: per-token
//! checks, whole-file scans, single replacements, multi-edit changesets and
//! dialect filtering.

mod colon_spacing;
mod control_signature;
mod disallow_long_array;
mod disallow_tab_indent;
mod line_endings;
mod line_length;
mod lower_case_keyword;
mod scope_closing_brace;
mod scope_indent;

pub use colon_spacing::ColonSpacing;
pub use control_signature::ControlSignature;
pub use disallow_long_array::DisallowLongArraySyntax;
pub use disallow_tab_indent::DisallowTabIndent;
pub use line_endings::LineEndings;
pub use line_length::LineLength;
pub use lower_case_keyword::LowerCaseKeyword;
pub use scope_closing_brace::ScopeClosingBrace;
pub use scope_indent::ScopeIndent;

use std::sync::Arc;

use crate::annotate::AnnotatedTokens;
use crate::fixer::Changeset;
use crate::sniff::Sniff;
use crate::tokens::TokenKind;

pub fn builtin() -> Vec<Arc<dyn Sniff>> {
    vec![
        Arc::new(LowerCaseKeyword),
        Arc::new(DisallowLongArraySyntax),
        Arc::new(DisallowTabIndent),
        Arc::new(ScopeIndent),
        Arc::new(LineEndings),
        Arc::new(LineLength),
        Arc::new(ControlSignature),
        Arc::new(ScopeClosingBrace),
        Arc::new(ColonSpacing),
    ]
}

/// The whitespace token indenting the line that `index` starts, if any.
fn indent_token(tokens: &AnnotatedTokens, index: usize) -> Option<usize> {
    let prev = index.checked_sub(1)?;
    let token = tokens.token(prev);
    (token.kind == TokenKind::Whitespace && token.column == 1 && !token.contains_newline())
        .then_some(prev)
}

/// Whether `index` is the first non-whitespace token on its line.
fn starts_line(tokens: &AnnotatedTokens, index: usize) -> bool {
    tokens.token(index).column == 1 || indent_token(tokens, index).is_some()
}

/// Set the indentation of the line starting at `index` to `width` spaces.
fn set_indent(cs: &mut Changeset, tokens: &AnnotatedTokens, index: usize, width: usize) {
    match indent_token(tokens, index) {
        Some(ws) => {
            cs.replace(ws, tokens.text(ws), " ".repeat(width));
        }
        None => {
            cs.insert_before(index, " ".repeat(width));
        }
    }
}
