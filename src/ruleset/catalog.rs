//! Every rule and composite standard the resolver can reference.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use crate::sniff::Sniff;

/// Codes raised by the engine itself rather than by a sniff. They can be
/// excluded or overridden but not included.
pub const INTERNAL_CODES: &[&str] = &["Internal.NoCodeFound", "Internal.InvalidUtf8"];

const PSR12: &str = include_str!("psr12.toml");

/// What a `ref` string points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Path(PathBuf),
    Composite(String),
    /// A standard (0), category (1) or rule (2) with the rules it covers.
    Rules {
        specificity: u8,
        codes: Vec<&'static str>,
    },
    /// A single violation code (specificity 3).
    Code { rule: Option<&'static str>, code: String },
}

#[derive(Clone, Default)]
pub struct Catalog {
    sniffs: BTreeMap<&'static str, Arc<dyn Sniff>>,
    composites: BTreeMap<String, String>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in sniffs plus the `PSR12` composite.
    pub fn builtin() -> Self {
        let mut catalog = crate::sniffs::builtin()
            .into_iter()
            .fold(Self::empty(), Catalog::with_sniff);
        catalog.composites.insert("PSR12".to_string(), PSR12.to_string());
        catalog
    }

    pub fn with_sniff(mut self, sniff: Arc<dyn Sniff>) -> Self {
        self.sniffs.insert(sniff.code(), sniff);
        self
    }

    /// Register a composite standard given as ruleset TOML.
    pub fn with_composite(mut self, name: impl Into<String>, toml: impl Into<String>) -> Self {
        self.composites.insert(name.into(), toml.into());
        self
    }

    pub fn sniff(&self, code: &str) -> Option<&Arc<dyn Sniff>> {
        self.sniffs.get(code)
    }

    /// Sniffs sorted by code.
    pub fn sniffs(&self) -> impl Iterator<Item = &Arc<dyn Sniff>> {
        self.sniffs.values()
    }

    pub fn composite(&self, name: &str) -> Option<&str> {
        self.composites.get(name).map(String::as_str)
    }

    pub fn standards(&self) -> BTreeSet<&str> {
        self.sniffs
            .keys()
            .filter_map(|code| code.split('.').next())
            .chain(self.composites.keys().map(String::as_str))
            .collect()
    }

    pub fn classify(&self, reference: &str) -> Option<Target> {
        if is_path(reference) {
            return Some(Target::Path(PathBuf::from(reference)));
        }
        if self.composites.contains_key(reference) {
            return Some(Target::Composite(reference.to_string()));
        }
        if INTERNAL_CODES.contains(&reference) {
            return Some(Target::Code {
                rule: None,
                code: reference.to_string(),
            });
        }

        let segments = reference.split('.').count();
        if reference.split('.').any(str::is_empty) {
            return None;
        }
        match segments {
            1..=2 => {
                let prefix = format!("{reference}.");
                let codes: Vec<&'static str> = self
                    .sniffs
                    .keys()
                    .copied()
                    .filter(|code| code.starts_with(&prefix))
                    .collect();
                (!codes.is_empty()).then_some(Target::Rules {
                    specificity: (segments - 1) as u8,
                    codes,
                })
            }
            3 => self.sniffs.get_key_value(reference).map(|(code, _)| Target::Rules {
                specificity: 2,
                codes: vec![*code],
            }),
            4 => {
                let (rule, _) = reference.rsplit_once('.')?;
                self.sniffs.get_key_value(rule).map(|(code, _)| Target::Code {
                    rule: Some(*code),
                    code: reference.to_string(),
                })
            }
            _ => None,
        }
    }

    /// Closest known reference by Jaro-Winkler similarity.
    pub fn suggest(&self, reference: &str) -> Option<String> {
        let mut candidates: BTreeSet<String> = BTreeSet::new();
        for code in self.sniffs.keys() {
            let parts: Vec<&str> = code.split('.').collect();
            for depth in 1..=parts.len() {
                candidates.insert(parts[..depth].join("."));
            }
        }
        candidates.extend(self.composites.keys().cloned());
        candidates.extend(INTERNAL_CODES.iter().map(|c| c.to_string()));

        candidates
            .into_iter()
            .map(|candidate| (strsim::jaro_winkler(reference, &candidate), candidate))
            .filter(|(score, _)| *score >= 0.8)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, candidate)| candidate)
    }
}

fn is_path(reference: &str) -> bool {
    reference.ends_with(".toml") || reference.contains('/') || reference.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_levels() {
        let catalog = Catalog::builtin();
        match catalog.classify("Generic").unwrap() {
            Target::Rules { specificity, codes } => {
                assert_eq!(specificity, 0);
                assert!(codes.contains(&"Generic.Files.LineLength"));
                assert!(!codes.iter().any(|c| c.starts_with("Squiz")));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            catalog.classify("Generic.Files"),
            Some(Target::Rules { specificity: 1, .. })
        ));
        assert!(matches!(
            catalog.classify("Generic.Files.LineLength"),
            Some(Target::Rules { specificity: 2, .. })
        ));
        assert_eq!(
            catalog.classify("Generic.Files.LineLength.TooLong"),
            Some(Target::Code {
                rule: Some("Generic.Files.LineLength"),
                code: "Generic.Files.LineLength.TooLong".to_string()
            })
        );
        assert_eq!(
            catalog.classify("PSR12"),
            Some(Target::Composite("PSR12".to_string()))
        );
        assert!(matches!(
            catalog.classify("rules/base.toml"),
            Some(Target::Path(_))
        ));
        assert!(matches!(
            catalog.classify("Internal.NoCodeFound"),
            Some(Target::Code { rule: None, .. })
        ));
    }

    #[test]
    fn test_unknown_references() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.classify("Generik"), None);
        assert_eq!(catalog.classify("Generic.Files.Nope"), None);
        assert_eq!(catalog.classify("Generic..LineLength"), None);
        assert_eq!(catalog.classify("A.B.C.D.E"), None);
    }

    #[test]
    fn test_suggest() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.suggest("Generic.Files.LineLenght").as_deref(),
            Some("Generic.Files.LineLength")
        );
        assert_eq!(catalog.suggest("zzzz"), None);
    }

    #[test]
    fn test_standards() {
        let catalog = Catalog::builtin();
        let standards = catalog.standards();
        assert!(standards.contains("Generic"));
        assert!(standards.contains("Squiz"));
        assert!(standards.contains("PSR12"));
    }
}
