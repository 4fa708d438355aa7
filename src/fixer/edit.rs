//! Token-anchored edits.
//!
//! Every edit is expressed against the token stream of the pass that
//! proposed it. An edit claims one *slot*: the token itself (`2i + 1`) for a
//! replacement, or the gap in front of a token (`2i`) for an insertion.
//! Two proposals conflict exactly when they claim a common slot.

use xxhash_rust::xxh3::xxh3_64;

/// What an edit does to its anchor token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    Replace,
    InsertBefore,
    InsertAfter,
}

/// Verification of the token text an edit was computed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    ExactMatch(String),
    /// xxh3 of the expected text, used for long tokens.
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected) => xxh3_64(text.as_bytes()) == *expected,
        }
    }

    /// Hash texts over 1KB, keep shorter ones verbatim.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

/// One edit against the current token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEdit {
    pub op: EditOp,
    pub token: usize,
    pub text: String,
    /// Present on replacements: the text being replaced.
    pub expected: Option<EditVerification>,
}

impl TokenEdit {
    pub fn slot(&self) -> usize {
        match self.op {
            EditOp::InsertBefore => 2 * self.token,
            EditOp::Replace => 2 * self.token + 1,
            EditOp::InsertAfter => 2 * self.token + 2,
        }
    }
}

/// An atomically applied group of edits proposed for one violation.
///
/// Inside a changeset, insertions into the same gap concatenate in
/// submission order and a repeated replacement of one token keeps the last
/// text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    edits: Vec<TokenEdit>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the text of `token`. `current` is the token's present text.
    pub fn replace(&mut self, token: usize, current: &str, text: impl Into<String>) -> &mut Self {
        self.edits.push(TokenEdit {
            op: EditOp::Replace,
            token,
            text: text.into(),
            expected: Some(EditVerification::from_text(current)),
        });
        self
    }

    pub fn insert_before(&mut self, token: usize, text: impl Into<String>) -> &mut Self {
        self.push_insert(EditOp::InsertBefore, token, text.into())
    }

    pub fn insert_after(&mut self, token: usize, text: impl Into<String>) -> &mut Self {
        self.push_insert(EditOp::InsertAfter, token, text.into())
    }

    fn push_insert(&mut self, op: EditOp, token: usize, text: String) -> &mut Self {
        if !text.is_empty() {
            self.edits.push(TokenEdit {
                op,
                token,
                text,
                expected: None,
            });
        }
        self
    }

    pub fn edits(&self) -> &[TokenEdit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Sorted, deduplicated slots claimed by this changeset.
    pub fn slots(&self) -> Vec<usize> {
        let mut slots: Vec<usize> = self.edits.iter().map(TokenEdit::slot).collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }
}

/// A changeset together with the ordering key used for conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Registration order of the proposing rule.
    pub rule_order: usize,
    /// Token the violation is anchored on.
    pub token: usize,
    /// Submission sequence within the pass.
    pub seq: usize,
    pub code: String,
    pub changeset: Changeset,
}

impl Proposal {
    pub fn sort_key(&self) -> (usize, usize, usize) {
        (self.rule_order, self.token, self.seq)
    }
}
