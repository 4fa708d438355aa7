//! Ruleset files, the rule catalog and resolution into an immutable
//! [`Ruleset`].

pub mod catalog;
pub mod loader;
pub mod resolver;
pub mod schema;
pub mod version;

pub use catalog::Catalog;
pub use loader::{load_from_path, load_from_str, LoadError};
pub use resolver::{Resolver, RulesetError};
pub use schema::{
    Metadata, RuleDirective, RulesetDefinition, Settings, ValidationError, ValidationIssue,
};
pub use version::{matches_requirement, VersionError};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::sniff::{PropertyBag, Sniff};
use crate::tokens::{Dialect, TokenKind};
use crate::violation::Severity;

/// Severity, type and message overrides for a rule or a single code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Override {
    pub severity: Option<u8>,
    pub kind: Option<Severity>,
    pub message: Option<String>,
}

impl Override {
    pub fn is_empty(&self) -> bool {
        self.severity.is_none() && self.kind.is_none() && self.message.is_none()
    }
}

/// One enabled rule with its resolved configuration.
#[derive(Clone)]
pub struct ResolvedRule {
    pub code: String,
    pub sniff: Arc<dyn Sniff>,
    pub properties: PropertyBag,
    pub overrides: Override,
}

impl fmt::Debug for ResolvedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRule")
            .field("code", &self.code)
            .field("properties", &self.properties)
            .field("overrides", &self.overrides)
            .finish()
    }
}

/// Engine settings after merging a ruleset with its includes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub tab_width: usize,
    pub max_passes: usize,
    pub error_severity: u8,
    pub warning_severity: u8,
    pub extensions: BTreeMap<String, Dialect>,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        let extensions = [
            ("php", Dialect::Php),
            ("inc", Dialect::Php),
            ("phtml", Dialect::Php),
            ("js", Dialect::Js),
            ("mjs", Dialect::Js),
            ("css", Dialect::Css),
        ]
        .into_iter()
        .map(|(ext, dialect)| (ext.to_string(), dialect))
        .collect();
        Self {
            tab_width: 4,
            max_passes: 50,
            error_severity: 5,
            warning_severity: 5,
            extensions,
        }
    }
}

/// The resolved, immutable rule configuration shared by every file of a
/// run.
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    rules: Vec<ResolvedRule>,
    registry: HashMap<(Dialect, TokenKind), Vec<usize>>,
    excluded_codes: BTreeSet<String>,
    code_overrides: BTreeMap<String, Override>,
    settings: ResolvedSettings,
}

impl Ruleset {
    pub(crate) fn new(
        rules: Vec<ResolvedRule>,
        excluded_codes: BTreeSet<String>,
        code_overrides: BTreeMap<String, Override>,
        settings: ResolvedSettings,
    ) -> Self {
        let mut registry: HashMap<(Dialect, TokenKind), Vec<usize>> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            for &dialect in rule.sniff.dialects() {
                for &kind in rule.sniff.register() {
                    let listeners = registry.entry((dialect, kind)).or_default();
                    if !listeners.contains(&index) {
                        listeners.push(index);
                    }
                }
            }
        }
        Self {
            rules,
            registry,
            excluded_codes,
            code_overrides,
            settings,
        }
    }

    /// Rules in registration order.
    pub fn rules(&self) -> &[ResolvedRule] {
        &self.rules
    }

    pub fn rule(&self, code: &str) -> Option<&ResolvedRule> {
        self.rules.iter().find(|rule| rule.code == code)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Indices of the rules listening for `kind` in `dialect`, in
    /// registration order.
    pub fn listeners(&self, dialect: Dialect, kind: TokenKind) -> &[usize] {
        self.registry
            .get(&(dialect, kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_code_excluded(&self, code: &str) -> bool {
        self.excluded_codes.contains(code)
    }

    pub fn excluded_codes(&self) -> impl Iterator<Item = &str> {
        self.excluded_codes.iter().map(String::as_str)
    }

    pub fn code_override(&self, code: &str) -> Option<&Override> {
        self.code_overrides.get(code)
    }

    pub fn settings(&self) -> &ResolvedSettings {
        &self.settings
    }

    /// Dialect for `path` according to the extension map.
    pub fn dialect_for(&self, path: &Path) -> Option<Dialect> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.settings.extensions.get(&ext).copied()
    }
}
