//! Resolution of a ruleset definition into a [`Ruleset`].
//!
//! Definitions are expanded depth first. Every include, exclude, property
//! and override becomes a decision stamped with `(specificity, order)`:
//! specificity is 0 for a standard, 1 for a category, 2 for a rule and 3
//! for a single code; order is a counter shared by the whole expansion.
//! For each rule (or property, or override) the greatest stamp wins, which
//! makes narrower references beat broader ones and later declarations beat
//! earlier ones at the same level.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use super::catalog::{Catalog, Target};
use super::loader::{self, LoadError};
use super::schema::{RuleDirective, RulesetDefinition, Settings};
use super::version::{matches_requirement, VersionError};
use super::{Override, ResolvedRule, ResolvedSettings, Ruleset};
use crate::sniff::{PropertyBag, PropertyKind, PropertyValue};
use crate::tokens::Dialect;
use crate::violation::Severity;

#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("unknown rule reference '{reference}'{}", did_you_mean(.suggestion))]
    UnknownReference {
        reference: String,
        suggestion: Option<String>,
    },
    #[error("rule '{rule}' has no property '{property}'")]
    UnknownProperty { rule: String, property: String },
    #[error("property '{property}' of rule '{rule}' expects {expected}, got {found}")]
    WrongPropertyType {
        rule: String,
        property: String,
        expected: PropertyKind,
        found: PropertyKind,
    },
    #[error("ruleset include cycle: {chain}")]
    IncludeCycle { chain: String },
    #[error("ruleset '{ruleset}' requires version {requirement}, this is {version}")]
    UnsupportedVersion {
        ruleset: String,
        requirement: String,
        version: String,
    },
    #[error("'{reference}' cannot be included, only excluded or overridden")]
    NotIncludable { reference: String },
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("built-in standard '{name}' is invalid: {source}")]
    Composite { name: String, source: LoadError },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

/// `(specificity, order)`; greater wins.
type Stamp = (u8, usize);

#[derive(Debug, Default, Clone)]
struct OverrideDecisions {
    severity: Option<(Stamp, u8)>,
    kind: Option<(Stamp, Severity)>,
    message: Option<(Stamp, String)>,
}

impl OverrideDecisions {
    fn apply(&mut self, stamp: Stamp, directive: &RuleDirective) {
        if let Some(severity) = directive.severity {
            set_if_newer(&mut self.severity, stamp, severity.clamp(0, 10) as u8);
        }
        if let Some(kind) = directive.violation_type.as_deref().and_then(Severity::parse) {
            set_if_newer(&mut self.kind, stamp, kind);
        }
        if let Some(message) = &directive.message {
            set_if_newer(&mut self.message, stamp, message.clone());
        }
    }

    fn finish(self) -> Override {
        Override {
            severity: self.severity.map(|(_, v)| v),
            kind: self.kind.map(|(_, v)| v),
            message: self.message.map(|(_, v)| v),
        }
    }
}

fn set_if_newer<T>(slot: &mut Option<(Stamp, T)>, stamp: Stamp, value: T) {
    if slot.as_ref().map_or(true, |(current, _)| stamp >= *current) {
        *slot = Some((stamp, value));
    }
}

/// Where a definition came from, for cycle detection.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Origin {
    Root,
    Composite(String),
    File(PathBuf),
}

impl Origin {
    fn label(&self) -> String {
        match self {
            Origin::Root => "<root>".to_string(),
            Origin::Composite(name) => name.clone(),
            Origin::File(path) => path.display().to_string(),
        }
    }
}

pub struct Resolver<'c> {
    catalog: &'c Catalog,
    version: String,
}

impl<'c> Resolver<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Tool version compared against `meta.requires`.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn resolve(&self, definition: &RulesetDefinition) -> Result<Ruleset, RulesetError> {
        let origin = match &definition.source {
            Some(path) => Origin::File(canonical(path)),
            None => Origin::Root,
        };
        let mut expansion = Expansion::new(self);
        expansion.expand(definition, origin)?;
        let ruleset = expansion.finish()?;
        debug!(
            rules = ruleset.len(),
            excluded_codes = ruleset.excluded_codes().count(),
            "resolved ruleset"
        );
        Ok(ruleset)
    }

    /// Resolve a single reference such as `PSR12` or a ruleset path.
    pub fn resolve_reference(&self, reference: &str) -> Result<Ruleset, RulesetError> {
        if reference.ends_with(".toml") {
            let definition = loader::load_from_path(reference)?;
            return self.resolve(&definition);
        }
        self.resolve(&RulesetDefinition {
            rules: vec![RuleDirective {
                reference: reference.to_string(),
                ..RuleDirective::default()
            }],
            ..RulesetDefinition::default()
        })
    }

    fn load_composite(&self, name: &str) -> Result<RulesetDefinition, RulesetError> {
        let source = self.catalog.composite(name).unwrap_or_default();
        loader::load_from_str(source).map_err(|source| RulesetError::Composite {
            name: name.to_string(),
            source,
        })
    }
}

struct Expansion<'r, 'c> {
    resolver: &'r Resolver<'c>,
    order: usize,
    stack: Vec<Origin>,
    /// Rule code to `(stamp, included)`.
    inclusion: HashMap<&'static str, (Stamp, bool)>,
    /// Rules in the order they were first included.
    first_included: Vec<&'static str>,
    /// Every include decision in expansion order, repeats kept.
    enabled: Vec<&'static str>,
    /// Code to `(order, excluded)`.
    code_exclusions: HashMap<String, (usize, bool)>,
    properties: HashMap<(&'static str, String), (Stamp, PropertyValue)>,
    rule_overrides: HashMap<&'static str, OverrideDecisions>,
    code_overrides: BTreeMap<String, OverrideDecisions>,
    settings: Settings,
}

impl<'r, 'c> Expansion<'r, 'c> {
    fn new(resolver: &'r Resolver<'c>) -> Self {
        Self {
            resolver,
            order: 0,
            stack: Vec::new(),
            inclusion: HashMap::new(),
            first_included: Vec::new(),
            enabled: Vec::new(),
            code_exclusions: HashMap::new(),
            properties: HashMap::new(),
            rule_overrides: HashMap::new(),
            code_overrides: BTreeMap::new(),
            settings: Settings::default(),
        }
    }

    fn catalog(&self) -> &'c Catalog {
        self.resolver.catalog
    }

    fn next_order(&mut self) -> usize {
        self.order += 1;
        self.order
    }

    fn expand(&mut self, definition: &RulesetDefinition, origin: Origin) -> Result<(), RulesetError> {
        self.check_cycle(&origin)?;

        if let Some(requirement) = definition.meta.requires.as_deref() {
            if !matches_requirement(&self.resolver.version, Some(requirement))? {
                return Err(RulesetError::UnsupportedVersion {
                    ruleset: if definition.meta.name.is_empty() {
                        origin.label()
                    } else {
                        definition.meta.name.clone()
                    },
                    requirement: requirement.to_string(),
                    version: self.resolver.version.clone(),
                });
            }
        }

        fill_settings(&mut self.settings, &definition.settings);
        self.stack.push(origin);

        let base = definition
            .source
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf);
        for directive in &definition.rules {
            self.apply_directive(directive, base.as_deref())?;
        }

        self.stack.pop();
        Ok(())
    }

    fn classify(&self, reference: &str, base: Option<&Path>) -> Result<Target, RulesetError> {
        let target = self
            .catalog()
            .classify(reference)
            .ok_or_else(|| RulesetError::UnknownReference {
                reference: reference.to_string(),
                suggestion: self.catalog().suggest(reference),
            })?;
        Ok(match target {
            Target::Path(path) if path.is_relative() => match base {
                Some(base) => Target::Path(base.join(path)),
                None => Target::Path(path),
            },
            other => other,
        })
    }

    fn apply_directive(
        &mut self,
        directive: &RuleDirective,
        base: Option<&Path>,
    ) -> Result<(), RulesetError> {
        let target = self.classify(&directive.reference, base)?;
        let order = self.next_order();

        match target {
            Target::Composite(name) => {
                let definition = self.resolver.load_composite(&name)?;
                self.include(&definition, Origin::Composite(name), directive)?;
            }
            Target::Path(path) => {
                let (definition, origin) = load_file(&path)?;
                self.include(&definition, origin, directive)?;
            }
            Target::Rules { specificity, codes } => {
                for &code in &codes {
                    self.decide_inclusion(code, (specificity, order), true);
                }
                self.configure_rules(&codes, (specificity, order), directive)?;
            }
            Target::Code { rule: None, code } => {
                return Err(RulesetError::NotIncludable { reference: code });
            }
            Target::Code {
                rule: Some(rule),
                code,
            } => {
                self.decide_inclusion(rule, (3, order), true);
                self.code_exclusions.insert(code.clone(), (order, false));
                self.code_overrides
                    .entry(code)
                    .or_default()
                    .apply((3, order), directive);
                self.assign_properties(&[rule], (3, order), directive)?;
            }
        }

        for excluded in &directive.exclude {
            self.apply_exclusion(excluded, base)?;
        }
        Ok(())
    }

    fn apply_exclusion(&mut self, reference: &str, base: Option<&Path>) -> Result<(), RulesetError> {
        let target = self.classify(reference, base)?;
        let order = self.next_order();
        match target {
            Target::Composite(name) => {
                let definition = self.resolver.load_composite(&name)?;
                self.exclude_all_of(&definition, Origin::Composite(name), order)?;
            }
            Target::Path(path) => {
                let (definition, origin) = load_file(&path)?;
                self.exclude_all_of(&definition, origin, order)?;
            }
            Target::Rules { specificity, codes } => {
                for code in codes {
                    self.decide_inclusion(code, (specificity, order), false);
                }
            }
            Target::Code { code, .. } => {
                self.code_exclusions.insert(code, (order, true));
            }
        }
        Ok(())
    }

    /// Expand an included ruleset, then apply the including directive's
    /// overrides and properties to every rule it enables, whether or not
    /// an earlier directive already had it on.
    fn include(
        &mut self,
        definition: &RulesetDefinition,
        origin: Origin,
        directive: &RuleDirective,
    ) -> Result<(), RulesetError> {
        let mark = self.enabled.len();
        self.expand(definition, origin)?;
        let order = self.next_order();
        let mut seen = BTreeSet::new();
        let enabled: Vec<&'static str> = self.enabled[mark..]
            .iter()
            .copied()
            .filter(|code| seen.insert(*code))
            .filter(|code| self.inclusion.get(code).is_some_and(|(_, on)| *on))
            .collect();
        self.configure_rules(&enabled, (0, order), directive)
    }

    /// Exclude, at standard level, every rule `definition` would enable.
    fn exclude_all_of(
        &mut self,
        definition: &RulesetDefinition,
        origin: Origin,
        order: usize,
    ) -> Result<(), RulesetError> {
        self.check_cycle(&origin)?;
        let ruleset = self.resolver.resolve(definition)?;
        for rule in ruleset.rules() {
            if let Some(sniff) = self.catalog().sniff(&rule.code) {
                self.decide_inclusion(sniff.code(), (0, order), false);
            }
        }
        Ok(())
    }

    fn check_cycle(&self, origin: &Origin) -> Result<(), RulesetError> {
        if !self.stack.contains(origin) {
            return Ok(());
        }
        let mut chain: Vec<String> = self.stack.iter().map(Origin::label).collect();
        chain.push(origin.label());
        Err(RulesetError::IncludeCycle {
            chain: chain.join(" -> "),
        })
    }

    fn decide_inclusion(&mut self, rule: &'static str, stamp: Stamp, include: bool) {
        let slot = self.inclusion.entry(rule).or_insert(((0, 0), false));
        if stamp >= slot.0 {
            *slot = (stamp, include);
        }
        if include {
            self.enabled.push(rule);
            if !self.first_included.contains(&rule) {
                self.first_included.push(rule);
            }
        }
    }

    fn configure_rules(
        &mut self,
        rules: &[&'static str],
        stamp: Stamp,
        directive: &RuleDirective,
    ) -> Result<(), RulesetError> {
        for &rule in rules {
            self.rule_overrides
                .entry(rule)
                .or_default()
                .apply(stamp, directive);
        }
        self.assign_properties(rules, stamp, directive)
    }

    /// Properties set through a rule or code reference are checked
    /// strictly; through a broader reference they only reach the rules
    /// that declare them.
    fn assign_properties(
        &mut self,
        rules: &[&'static str],
        stamp: Stamp,
        directive: &RuleDirective,
    ) -> Result<(), RulesetError> {
        let strict = stamp.0 >= 2;
        for (name, value) in &directive.properties {
            for &rule in rules {
                let Some(sniff) = self.catalog().sniff(rule) else {
                    continue;
                };
                let spec = sniff.properties().into_iter().find(|p| p.name == name);
                let coerced = match &spec {
                    None if strict => {
                        return Err(RulesetError::UnknownProperty {
                            rule: rule.to_string(),
                            property: name.clone(),
                        })
                    }
                    None => {
                        trace!(rule, property = %name, "property not declared, ignored");
                        continue;
                    }
                    Some(spec) => spec.kind.coerce(value),
                };
                let Some(coerced) = coerced else {
                    let expected = spec.as_ref().map(|s| s.kind).unwrap_or(PropertyKind::Str);
                    if strict {
                        return Err(RulesetError::WrongPropertyType {
                            rule: rule.to_string(),
                            property: name.clone(),
                            expected,
                            found: value.kind(),
                        });
                    }
                    trace!(rule, property = %name, %expected, "property type mismatch, ignored");
                    continue;
                };
                let key = (rule, name.clone());
                let replace = self
                    .properties
                    .get(&key)
                    .map_or(true, |(current, _)| stamp >= *current);
                if replace {
                    self.properties.insert(key, (stamp, coerced));
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Ruleset, RulesetError> {
        let catalog = self.catalog();
        let mut properties = self.properties;
        let mut rule_overrides = self.rule_overrides;

        let mut rules = Vec::new();
        for code in self.first_included.iter().copied() {
            if !self.inclusion.get(code).is_some_and(|(_, on)| *on) {
                continue;
            }
            let Some(sniff) = catalog.sniff(code) else {
                continue;
            };
            let overrides = rule_overrides.remove(code).unwrap_or_default().finish();
            if overrides.severity == Some(0) {
                trace!(rule = code, "severity 0, rule disabled");
                continue;
            }
            let specs = sniff.properties();
            let mut bag = PropertyBag::from_specs(&specs);
            for spec in &specs {
                if let Some((_, value)) = properties.remove(&(code, spec.name.to_string())) {
                    bag.set(spec.name, value);
                }
            }
            rules.push(ResolvedRule {
                code: code.to_string(),
                sniff: sniff.clone(),
                properties: bag,
                overrides,
            });
        }

        let excluded_codes = self
            .code_exclusions
            .into_iter()
            .filter(|(_, (_, excluded))| *excluded)
            .map(|(code, _)| code)
            .collect();
        let code_overrides = self
            .code_overrides
            .into_iter()
            .map(|(code, decisions)| (code, decisions.finish()))
            .filter(|(_, o)| !o.is_empty())
            .collect();

        Ok(Ruleset::new(
            rules,
            excluded_codes,
            code_overrides,
            resolve_settings(&self.settings),
        ))
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn load_file(path: &Path) -> Result<(RulesetDefinition, Origin), RulesetError> {
    let definition = loader::load_from_path(path)?;
    Ok((definition, Origin::File(canonical(path))))
}

/// Copy every field `from` sets that `into` leaves unset.
fn fill_settings(into: &mut Settings, from: &Settings) {
    into.tab_width = into.tab_width.or(from.tab_width);
    into.max_passes = into.max_passes.or(from.max_passes);
    into.error_severity = into.error_severity.or(from.error_severity);
    into.warning_severity = into.warning_severity.or(from.warning_severity);
    for (ext, dialect) in &from.extensions {
        into.extensions
            .entry(ext.clone())
            .or_insert_with(|| dialect.clone());
    }
}

fn resolve_settings(settings: &Settings) -> ResolvedSettings {
    let mut resolved = ResolvedSettings::default();
    if let Some(tab_width) = settings.tab_width {
        resolved.tab_width = tab_width;
    }
    if let Some(max_passes) = settings.max_passes {
        resolved.max_passes = max_passes.max(1);
    }
    if let Some(level) = settings.error_severity {
        resolved.error_severity = level.clamp(0, 10) as u8;
    }
    if let Some(level) = settings.warning_severity {
        resolved.warning_severity = level.clamp(0, 10) as u8;
    }
    for (ext, dialect) in &settings.extensions {
        if let Some(dialect) = Dialect::parse(dialect) {
            resolved
                .extensions
                .insert(ext.trim_start_matches('.').to_ascii_lowercase(), dialect);
        }
    }
    resolved
}
