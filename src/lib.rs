//! Sniffwright: a token-stream coding standard checker
//!
//! Source files are lexed into a gap-free token stream, annotated with
//! bracket, scope and parenthesis structure, and handed to the sniffs a
//! ruleset enables. Sniffs report violations and may propose token-level
//! fixes; the fixer applies non-conflicting proposals and re-runs until the
//! file stops changing or a bound is hit.
//!
//! # Architecture
//!
//! - [`tokens`]: lexer for the PHP, JS and CSS dialects
//! - [`annotate`]: structural annotation over a token stream
//! - [`ruleset`]: ruleset files, built-in standards and resolution
//! - [`dispatch`]: runs the listening sniffs over one file
//! - [`fixer`]: changesets, conflict selection and the fix loop
//! - [`runner`]: parallel check and fix over many files
//!
//! # Example
//!
//! ```
//! use sniffwright::{check_source, Catalog, Dialect, Resolver};
//!
//! let catalog = Catalog::builtin();
//! let ruleset = Resolver::new(&catalog)
//!     .resolve_reference("Generic.PHP.LowerCaseKeyword")
//!     .unwrap();
//! let violations = check_source("<?php\nECHO 1;\n", Dialect::Php, &ruleset);
//! assert_eq!(violations[0].code, "Generic.PHP.LowerCaseKeyword.Found");
//! ```

pub mod annotate;
pub mod dispatch;
pub mod files;
pub mod fixer;
pub mod ruleset;
pub mod runner;
pub mod sniff;
pub mod sniffs;
pub mod suppress;
pub mod tokens;
pub mod violation;

// Re-exports
pub use annotate::{AnnotatedTokens, Annotation};
pub use dispatch::{dispatch, DispatchOptions, DispatchOutcome};
pub use files::{discover, FileError, SourceFile};
pub use fixer::{fix, ExhaustionReason, FixOptions, FixOutcome, FixReport};
pub use ruleset::{
    load_from_path, load_from_str, Catalog, LoadError, Resolver, Ruleset, RulesetError,
};
pub use runner::{FileReport, RunOptions, RunReport, Runner};
pub use sniff::{PropertySpec, PropertyValue, Sniff, SniffContext, SniffFlow};
pub use tokens::{tokenize, Dialect, LexOptions, Token, TokenKind};
pub use violation::{Severity, Violation};

/// Check one in-memory source and return its violations.
pub fn check_source(source: &str, dialect: Dialect, ruleset: &Ruleset) -> Vec<Violation> {
    let lex = LexOptions::new(dialect).with_tab_width(ruleset.settings().tab_width);
    let tokens = AnnotatedTokens::from_source(source, lex);
    dispatch(&tokens, ruleset, &DispatchOptions::for_ruleset(ruleset)).violations
}
