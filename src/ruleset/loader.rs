use crate::ruleset::schema::{RulesetDefinition, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum LoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl LoadError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            LoadError::Toml { path: None, source } => LoadError::Toml {
                path: Some(path),
                source,
            },
            LoadError::Validation { path: None, source } => LoadError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read ruleset {}: {}", path.display(), source)
            }
            LoadError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse ruleset TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse ruleset TOML: {}", source),
            },
            LoadError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid ruleset ({}): {}", path.display(), source),
                None => write!(f, "invalid ruleset: {}", source),
            },
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Toml { source, .. } => Some(source),
            LoadError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<RulesetDefinition, LoadError> {
    let definition: RulesetDefinition = toml_edit::de::from_str(input)
        .map_err(|source| LoadError::Toml { path: None, source })?;
    definition
        .validate()
        .map_err(|source| LoadError::Validation { path: None, source })?;
    Ok(definition)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RulesetDefinition, LoadError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut definition = load_from_str(&contents).map_err(|error| error.with_path(path))?;
    definition.source = Some(path.to_path_buf());
    Ok(definition)
}
