//! Tool version requirements declared by rulesets (`meta.requires`).

use semver::{Version, VersionReq};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    InvalidVersion { value: String, source: String },
    InvalidRequirement { value: String, source: String },
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::InvalidVersion { value, source } => {
                write!(f, "invalid version '{}': {}", value, source)
            }
            VersionError::InvalidRequirement { value, source } => {
                write!(f, "invalid version requirement '{}': {}", value, source)
            }
        }
    }
}

impl std::error::Error for VersionError {}

/// Whether `version` satisfies `requirement`. A missing or blank
/// requirement accepts every version.
///
/// ```
/// use sniffwright::ruleset::version::matches_requirement;
///
/// assert!(matches_requirement("0.1.0", Some(">=0.1")).unwrap());
/// assert!(!matches_requirement("0.1.0", Some(">=0.2, <0.4")).unwrap());
/// assert!(matches_requirement("0.1.0", None).unwrap());
/// ```
pub fn matches_requirement(
    version: &str,
    requirement: Option<&str>,
) -> Result<bool, VersionError> {
    let Some(req_str) = requirement.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(true);
    };

    let version = Version::parse(version).map_err(|e| VersionError::InvalidVersion {
        value: version.to_string(),
        source: e.to_string(),
    })?;
    let req = VersionReq::parse(req_str).map_err(|e| VersionError::InvalidRequirement {
        value: req_str.to_string(),
        source: e.to_string(),
    })?;

    Ok(req.matches(&version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_requirement() {
        assert!(matches_requirement("0.1.0", Some("  ")).unwrap());
    }

    #[test]
    fn test_compound_requirement() {
        let req = ">=0.1.0, <0.3.0";
        assert!(matches_requirement("0.1.0", Some(req)).unwrap());
        assert!(matches_requirement("0.2.9", Some(req)).unwrap());
        assert!(!matches_requirement("0.3.0", Some(req)).unwrap());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            matches_requirement("one", Some(">=0.1")),
            Err(VersionError::InvalidVersion { .. })
        ));
        assert!(matches!(
            matches_requirement("0.1.0", Some(">=bad")),
            Err(VersionError::InvalidRequirement { .. })
        ));
    }
}
