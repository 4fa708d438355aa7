use serde::Serialize;
use std::fmt;

/// Violation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// One reported problem. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub line: usize,
    pub column: usize,
    /// Index of the token the violation is anchored on.
    pub token: usize,
    /// Fully qualified code, `Standard.Category.Rule.Specific`.
    pub code: String,
    pub severity: Severity,
    /// Numeric level (1-10) compared against the reporting thresholds.
    pub level: u8,
    pub message: String,
    pub fixable: bool,
}

impl Violation {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// `Standard.Category.Rule` part of the code.
    pub fn rule(&self) -> &str {
        match self.code.rsplit_once('.') {
            Some((rule, _)) if self.code.split('.').count() >= 4 => rule,
            _ => &self.code,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} {} ({})",
            self.line, self.column, self.severity, self.message, self.code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(code: &str) -> Violation {
        Violation {
            line: 3,
            column: 7,
            token: 12,
            code: code.to_string(),
            severity: Severity::Warning,
            level: 5,
            message: "Line exceeds 80 characters".to_string(),
            fixable: false,
        }
    }

    #[test]
    fn test_rule_prefix() {
        assert_eq!(
            violation("Generic.Files.LineLength.TooLong").rule(),
            "Generic.Files.LineLength"
        );
        assert_eq!(violation("Internal.NoCodeFound").rule(), "Internal.NoCodeFound");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            violation("Generic.Files.LineLength.TooLong").to_string(),
            "3:7 warning Line exceeds 80 characters (Generic.Files.LineLength.TooLong)"
        );
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!(Severity::parse("Error"), Some(Severity::Error));
        assert_eq!(Severity::parse("notice"), None);
    }
}
