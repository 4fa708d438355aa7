//! Structural annotation of a token stream.
//!
//! [`AnnotatedTokens`] owns a token vector and one [`Annotation`] per token.
//! All cross references are indices into the same vector, so the structure
//! is rebuilt wholesale after every rewrite rather than patched.

mod scopes;

use crate::tokens::{self, Dialect, LexOptions, Token, TokenKind};

/// Scope owners enclosing a token, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions(Vec<(usize, TokenKind)>);

impl Conditions {
    pub fn iter(&self) -> impl Iterator<Item = (usize, TokenKind)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_kind(&self, kind: TokenKind) -> bool {
        self.0.iter().any(|(_, k)| *k == kind)
    }

    pub fn innermost(&self) -> Option<(usize, TokenKind)> {
        self.0.last().copied()
    }

    fn remove_owner(&mut self, owner: usize) {
        self.0.retain(|(o, _)| *o != owner);
    }
}

impl FromIterator<(usize, TokenKind)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (usize, TokenKind)>>(iter: I) -> Self {
        Conditions(iter.into_iter().collect())
    }
}

/// Structural facts about one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Kind after disambiguation (`Closure`, `OpenShortArray`, ...).
    pub kind: TokenKind,
    pub bracket_partner: Option<usize>,
    /// Set on openers that were never closed and closers with no opener.
    pub unmatched: bool,
    pub scope_condition: Option<usize>,
    pub scope_opener: Option<usize>,
    pub scope_closer: Option<usize>,
    pub conditions: Conditions,
    pub nesting_level: usize,
    /// Enclosing `(` and `[` openers, outermost first.
    pub parenthesis_stack: Vec<usize>,
    pub parenthesis_owner: Option<usize>,
    pub parenthesis_opener: Option<usize>,
    pub parenthesis_closer: Option<usize>,
}

impl Annotation {
    fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            bracket_partner: None,
            unmatched: false,
            scope_condition: None,
            scope_opener: None,
            scope_closer: None,
            conditions: Conditions::default(),
            nesting_level: 0,
            parenthesis_stack: Vec::new(),
            parenthesis_owner: None,
            parenthesis_opener: None,
            parenthesis_closer: None,
        }
    }
}

/// Compute annotations for `tokens`. A pure function of its input.
pub fn annotate(tokens: &[Token], dialect: Dialect) -> Vec<Annotation> {
    scopes::Builder::new(tokens, dialect).run()
}

/// A token stream with its structural annotations.
#[derive(Debug, Clone)]
pub struct AnnotatedTokens {
    dialect: Dialect,
    tokens: Vec<Token>,
    annotations: Vec<Annotation>,
}

impl AnnotatedTokens {
    pub fn new(tokens: Vec<Token>, dialect: Dialect) -> Self {
        let annotations = annotate(&tokens, dialect);
        Self {
            dialect,
            tokens,
            annotations,
        }
    }

    pub fn from_source(source: &str, options: LexOptions) -> Self {
        Self::new(tokens::tokenize_with(source, options), options.dialect)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> &Token {
        &self.tokens[index]
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, index: usize) -> &Annotation {
        &self.annotations[index]
    }

    /// Resolved kind of the token at `index`.
    pub fn kind(&self, index: usize) -> TokenKind {
        self.annotations[index].kind
    }

    pub fn text(&self, index: usize) -> &str {
        &self.tokens[index].text
    }

    /// Next token after `index` that is not whitespace or a comment.
    pub fn next_significant(&self, index: usize) -> Option<usize> {
        (index + 1..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_insignificant())
    }

    /// Previous token before `index` that is not whitespace or a comment.
    pub fn prev_significant(&self, index: usize) -> Option<usize> {
        (0..index)
            .rev()
            .find(|&i| !self.tokens[i].kind.is_insignificant())
    }

    /// First token starting on the same line as `index`.
    pub fn first_on_line(&self, index: usize) -> usize {
        let line = self.tokens[index].line;
        let mut first = index;
        while first > 0 && self.tokens[first - 1].line == line {
            first -= 1;
        }
        first
    }

    /// First token on the line of `index` that is not whitespace.
    pub fn first_content_on_line(&self, index: usize) -> usize {
        let line = self.tokens[index].line;
        let mut i = self.first_on_line(index);
        while i < index
            && self.tokens[i].kind == TokenKind::Whitespace
            && self.tokens[i + 1].line == line
        {
            i += 1;
        }
        i
    }

    /// Indentation width of the line holding `index`, in columns.
    pub fn line_indent(&self, index: usize) -> usize {
        self.tokens[self.first_content_on_line(index)].column - 1
    }

    /// Rebuild the source text.
    pub fn render(&self) -> String {
        tokens::render(&self.tokens)
    }
}
