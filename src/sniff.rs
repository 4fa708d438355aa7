//! The sniff contract: what a rule declares and what it can do while
//! processing a token.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::annotate::AnnotatedTokens;
use crate::dispatch::{DispatchOptions, Sink};
use crate::fixer::{Changeset, Proposal};
use crate::ruleset::{ResolvedRule, Ruleset};
use crate::suppress::Suppressions;
use crate::tokens::{Dialect, TokenKind};
use crate::violation::{Severity, Violation};

/// Level used when neither the rule nor the code has a severity override.
pub const DEFAULT_LEVEL: u8 = 5;

/// Declared type of a configurable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Bool,
    Int,
    Str,
    List,
}

impl PropertyKind {
    /// Coerce `value` to this kind. Lists also accept a comma separated
    /// string.
    pub fn coerce(self, value: &PropertyValue) -> Option<PropertyValue> {
        match (self, value) {
            (PropertyKind::Bool, PropertyValue::Bool(_))
            | (PropertyKind::Int, PropertyValue::Int(_))
            | (PropertyKind::Str, PropertyValue::Str(_))
            | (PropertyKind::List, PropertyValue::List(_)) => Some(value.clone()),
            (PropertyKind::List, PropertyValue::Str(s)) => Some(PropertyValue::List(
                s.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Bool => "bool",
            PropertyKind::Int => "integer",
            PropertyKind::Str => "string",
            PropertyKind::List => "list",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Str(_) => PropertyKind::Str,
            PropertyValue::List(_) => PropertyKind::List,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Int(n) => write!(f, "{n}"),
            PropertyValue::Str(s) => write!(f, "{s:?}"),
            PropertyValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// A property a sniff accepts from the ruleset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub default: PropertyValue,
    pub description: &'static str,
}

impl PropertySpec {
    pub fn bool(name: &'static str, default: bool, description: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Bool,
            default: PropertyValue::Bool(default),
            description,
        }
    }

    pub fn int(name: &'static str, default: i64, description: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Int,
            default: PropertyValue::Int(default),
            description,
        }
    }

    pub fn string(name: &'static str, default: &str, description: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Str,
            default: PropertyValue::Str(default.to_string()),
            description,
        }
    }

    pub fn list(name: &'static str, default: &[&str], description: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::List,
            default: PropertyValue::List(default.iter().map(|s| s.to_string()).collect()),
            description,
        }
    }
}

/// Resolved property values of one rule.
///
/// The dispatcher hands every file its own clone, so a sniff may also keep
/// per-file scratch values here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBag(BTreeMap<String, PropertyValue>);

impl PropertyBag {
    pub fn from_specs(specs: &[PropertySpec]) -> Self {
        PropertyBag(
            specs
                .iter()
                .map(|spec| (spec.name.to_string(), spec.default.clone()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.0.insert(name.into(), value);
    }

    pub fn bool(&self, name: &str) -> bool {
        self.get(name).and_then(PropertyValue::as_bool).unwrap_or(false)
    }

    pub fn int(&self, name: &str) -> i64 {
        self.get(name).and_then(PropertyValue::as_int).unwrap_or(0)
    }

    pub fn str(&self, name: &str) -> &str {
        self.get(name).and_then(PropertyValue::as_str).unwrap_or("")
    }

    pub fn list(&self, name: &str) -> &[String] {
        self.get(name).and_then(PropertyValue::as_list).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What the dispatcher should do with a sniff after a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SniffFlow {
    #[default]
    Continue,
    /// Ignore this sniff's registrations before the given token index.
    SkipTo(usize),
    /// Ignore this sniff for the rest of the file.
    SkipFile,
}

/// A rule checker.
///
/// Implementations are stateless; anything that must survive between
/// callbacks on one file goes in the [`PropertyBag`].
pub trait Sniff: Send + Sync {
    /// `Standard.Category.Rule`.
    fn code(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Resolved token kinds this sniff listens for.
    fn register(&self) -> &'static [TokenKind];

    fn properties(&self) -> Vec<PropertySpec> {
        Vec::new()
    }

    fn dialects(&self) -> &'static [Dialect] {
        &Dialect::ALL
    }

    fn process(&self, ctx: &mut SniffContext<'_>, index: usize) -> SniffFlow;
}

/// Everything a sniff sees while processing one token.
pub struct SniffContext<'a> {
    tokens: &'a AnnotatedTokens,
    properties: &'a mut PropertyBag,
    rule: &'a ResolvedRule,
    rule_order: usize,
    ruleset: &'a Ruleset,
    suppressions: &'a Suppressions,
    options: &'a DispatchOptions,
    sink: &'a mut Sink,
}

impl<'a> SniffContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        tokens: &'a AnnotatedTokens,
        properties: &'a mut PropertyBag,
        rule: &'a ResolvedRule,
        rule_order: usize,
        ruleset: &'a Ruleset,
        suppressions: &'a Suppressions,
        options: &'a DispatchOptions,
        sink: &'a mut Sink,
    ) -> Self {
        Self {
            tokens,
            properties,
            rule,
            rule_order,
            ruleset,
            suppressions,
            options,
            sink,
        }
    }

    /// The annotated stream. Borrowed for the whole callback, so it can be
    /// captured by a fix closure.
    pub fn tokens(&self) -> &'a AnnotatedTokens {
        self.tokens
    }

    pub fn properties(&self) -> &PropertyBag {
        self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyBag {
        self.properties
    }

    pub fn tab_width(&self) -> usize {
        self.ruleset.settings().tab_width
    }

    pub fn is_fixing(&self) -> bool {
        self.options.fixing
    }

    pub fn add_error(&mut self, index: usize, code: &str, message: impl Into<String>) -> bool {
        self.record(index, code, message.into(), Severity::Error, None, None::<fn(&mut Changeset)>)
    }

    pub fn add_warning(&mut self, index: usize, code: &str, message: impl Into<String>) -> bool {
        self.record(index, code, message.into(), Severity::Warning, None, None::<fn(&mut Changeset)>)
    }

    /// Report a fixable error. `fix` runs only when fixing and the
    /// violation survives overrides, suppression and thresholds.
    pub fn add_fixable_error<F>(
        &mut self,
        index: usize,
        code: &str,
        message: impl Into<String>,
        fix: F,
    ) -> bool
    where
        F: FnOnce(&mut Changeset),
    {
        self.record(index, code, message.into(), Severity::Error, None, Some(fix))
    }

    pub fn add_fixable_warning<F>(
        &mut self,
        index: usize,
        code: &str,
        message: impl Into<String>,
        fix: F,
    ) -> bool
    where
        F: FnOnce(&mut Changeset),
    {
        self.record(index, code, message.into(), Severity::Warning, None, Some(fix))
    }

    /// Report a violation on a `line` inside the token at `index`, for
    /// tokens such as block comments that span several lines.
    pub fn add_on_line(
        &mut self,
        index: usize,
        line: usize,
        severity: Severity,
        code: &str,
        message: impl Into<String>,
    ) -> bool {
        self.record(
            index,
            code,
            message.into(),
            severity,
            Some(line),
            None::<fn(&mut Changeset)>,
        )
    }

    fn record<F>(
        &mut self,
        index: usize,
        specific: &str,
        message: String,
        severity: Severity,
        line: Option<usize>,
        fix: Option<F>,
    ) -> bool
    where
        F: FnOnce(&mut Changeset),
    {
        let code = format!("{}.{}", self.rule.code, specific);
        if self.ruleset.is_code_excluded(&code) {
            return false;
        }

        let by_code = self.ruleset.code_override(&code);
        let by_rule = &self.rule.overrides;
        let level = by_code
            .and_then(|o| o.severity)
            .or(by_rule.severity)
            .unwrap_or(DEFAULT_LEVEL);
        let severity = by_code
            .and_then(|o| o.kind)
            .or(by_rule.kind)
            .unwrap_or(severity);
        let message = by_code
            .and_then(|o| o.message.clone())
            .or_else(|| by_rule.message.clone())
            .unwrap_or(message);

        let threshold = match severity {
            Severity::Error => self.options.error_severity,
            Severity::Warning => self.options.warning_severity,
        };
        if level == 0 || threshold == 0 || level < threshold {
            return false;
        }

        let tokens = self.tokens;
        let token = tokens.token(index);
        let (line, column) = match line {
            Some(line) if line != token.line => (line, 1),
            _ => (token.line, token.column),
        };
        if self.suppressions.is_suppressed(line, &code) {
            return false;
        }

        let fixable = fix.is_some();
        if let Some(fix) = fix.filter(|_| self.options.fixing) {
            let mut changeset = Changeset::new();
            fix(&mut changeset);
            if !changeset.is_empty() {
                let seq = self.sink.next_seq();
                self.sink.proposals.push(Proposal {
                    rule_order: self.rule_order,
                    token: index,
                    seq,
                    code: code.clone(),
                    changeset,
                });
            }
        }

        self.sink.push(
            self.rule_order,
            Violation {
                line,
                column,
                token: index,
                code,
                severity,
                level,
                message,
                fixable,
            },
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce() {
        assert_eq!(
            PropertyKind::List.coerce(&PropertyValue::Str("a, b,,c".into())),
            Some(PropertyValue::List(vec!["a".into(), "b".into(), "c".into()]))
        );
        assert_eq!(PropertyKind::Int.coerce(&PropertyValue::Str("4".into())), None);
        assert_eq!(
            PropertyKind::Bool.coerce(&PropertyValue::Bool(true)),
            Some(PropertyValue::Bool(true))
        );
    }

    #[test]
    fn test_bag_defaults() {
        let bag = PropertyBag::from_specs(&[
            PropertySpec::int("indent", 4, "spaces per level"),
            PropertySpec::list("ignore", &["a"], "ignored names"),
        ]);
        assert_eq!(bag.int("indent"), 4);
        assert_eq!(bag.list("ignore"), ["a".to_string()]);
        assert_eq!(bag.int("missing"), 0);
        assert!(!bag.bool("indent"));
    }

    #[test]
    fn test_property_value_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            values: BTreeMap<String, PropertyValue>,
        }
        let parsed: Wrapper = toml_edit::de::from_str(
            "[values]\nflag = true\nwidth = 120\neol = \"\\n\"\nnames = [\"a\", \"b\"]\n",
        )
        .unwrap();
        assert_eq!(parsed.values["flag"], PropertyValue::Bool(true));
        assert_eq!(parsed.values["width"], PropertyValue::Int(120));
        assert_eq!(parsed.values["eol"], PropertyValue::Str("\n".into()));
        assert_eq!(
            parsed.values["names"],
            PropertyValue::List(vec!["a".into(), "b".into()])
        );
    }
}
