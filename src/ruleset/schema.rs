use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::sniff::PropertyValue;
use crate::tokens::Dialect;
use crate::violation::Severity;

/// A ruleset file as written on disk.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct RulesetDefinition {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleDirective>,
    /// File the definition was loaded from; relative `ref` paths resolve
    /// against its directory.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl RulesetDefinition {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.reference.trim().is_empty() {
                issues.push(ValidationIssue::EmptyReference { index });
            }
            for excluded in &rule.exclude {
                if excluded.trim().is_empty() {
                    issues.push(ValidationIssue::EmptyReference { index });
                }
            }
            if let Some(severity) = rule.severity {
                if !(0..=10).contains(&severity) {
                    issues.push(ValidationIssue::SeverityOutOfRange {
                        reference: rule.reference.clone(),
                        value: severity,
                    });
                }
            }
            if let Some(kind) = &rule.violation_type {
                if Severity::parse(kind).is_none() {
                    issues.push(ValidationIssue::InvalidType {
                        reference: rule.reference.clone(),
                        value: kind.clone(),
                    });
                }
            }
        }

        let settings = &self.settings;
        for (name, value) in [
            ("error_severity", settings.error_severity),
            ("warning_severity", settings.warning_severity),
        ] {
            if let Some(value) = value {
                if !(0..=10).contains(&value) {
                    issues.push(ValidationIssue::InvalidSetting {
                        name,
                        message: format!("{value} is outside 0..=10"),
                    });
                }
            }
        }
        if settings.max_passes == Some(0) {
            issues.push(ValidationIssue::InvalidSetting {
                name: "max_passes",
                message: "must be at least 1".to_string(),
            });
        }
        for (extension, dialect) in &settings.extensions {
            if Dialect::parse(dialect).is_none() {
                issues.push(ValidationIssue::UnknownDialect {
                    extension: extension.clone(),
                    value: dialect.clone(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Semver requirement on the tool version, e.g. `">=0.1, <0.3"`.
    #[serde(default)]
    pub requires: Option<String>,
}

/// Engine settings. Unset fields are filled from included rulesets, then
/// from the defaults.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub tab_width: Option<usize>,
    #[serde(default)]
    pub max_passes: Option<usize>,
    #[serde(default)]
    pub error_severity: Option<i64>,
    #[serde(default)]
    pub warning_severity: Option<i64>,
    /// File extension (without dot) to dialect name.
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RuleDirective {
    /// Standard, category, rule, code, composite name or ruleset path.
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// 0-10; 0 disables.
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default, rename = "type")]
    pub violation_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyReference {
        index: usize,
    },
    SeverityOutOfRange {
        reference: String,
        value: i64,
    },
    InvalidType {
        reference: String,
        value: String,
    },
    InvalidSetting {
        name: &'static str,
        message: String,
    },
    UnknownDialect {
        extension: String,
        value: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyReference { index } => {
                write!(f, "rule #{} has an empty reference", index + 1)
            }
            ValidationIssue::SeverityOutOfRange { reference, value } => {
                write!(f, "rule '{reference}' has severity {value}, expected 0-10")
            }
            ValidationIssue::InvalidType { reference, value } => write!(
                f,
                "rule '{reference}' has type '{value}', expected 'error' or 'warning'"
            ),
            ValidationIssue::InvalidSetting { name, message } => {
                write!(f, "setting '{name}' is invalid: {message}")
            }
            ValidationIssue::UnknownDialect { extension, value } => {
                write!(f, "extension '{extension}' maps to unknown dialect '{value}'")
            }
        }
    }
}
