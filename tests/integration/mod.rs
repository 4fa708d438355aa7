//! Engine-level integration tests
//!
//! Whole pipeline runs (lex, annotate, resolve, dispatch, fix) on in-memory
//! sources, plus property tests over generated token soup.

mod properties;
mod scenarios;

use sniffwright::{load_from_str, Catalog, Resolver, Ruleset};

/// Resolve an inline ruleset against the built-in catalog.
pub fn ruleset(toml: &str) -> Ruleset {
    let catalog = Catalog::builtin();
    Resolver::new(&catalog)
        .resolve(&load_from_str(toml).expect("ruleset parses"))
        .expect("ruleset resolves")
}
