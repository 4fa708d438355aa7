//! Reading, discovering and atomically writing source files.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::trace;
use walkdir::WalkDir;

use crate::ruleset::ResolvedSettings;
use crate::tokens::Dialect;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8 (first bad byte at offset {valid_up_to})", path.display())]
    InvalidUtf8 { path: PathBuf, valid_up_to: usize },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("no such file or directory: {}", path.display())]
    Missing { path: PathBuf },
}

/// A file selected for checking.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    pub path: PathBuf,
    pub dialect: Dialect,
}

/// Read `path` as UTF-8 text.
pub fn read_source(path: &Path) -> Result<String, FileError> {
    let bytes = fs::read(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|err| FileError::InvalidUtf8 {
        path: path.to_path_buf(),
        valid_up_to: err.utf8_error().valid_up_to(),
    })
}

/// Expand files and directories into the sorted list of checkable files.
///
/// Directories are walked recursively, skipping hidden entries; only files
/// whose extension is in the settings' map are kept. A file named
/// explicitly falls back to the built-in extension map.
pub fn discover(paths: &[PathBuf], settings: &ResolvedSettings) -> Result<Vec<SourceFile>, FileError> {
    let mut found = BTreeSet::new();
    for root in paths {
        if root.is_file() {
            match dialect_for(root, settings).or_else(|| Dialect::from_path(root)) {
                Some(dialect) => {
                    found.insert(SourceFile {
                        path: root.clone(),
                        dialect,
                    });
                }
                None => trace!(path = %root.display(), "no dialect, skipped"),
            }
            continue;
        }
        if !root.exists() {
            return Err(FileError::Missing { path: root.clone() });
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));
        for entry in walker {
            let entry = entry.map_err(|source| FileError::Walk {
                path: root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(dialect) = dialect_for(entry.path(), settings) {
                found.insert(SourceFile {
                    path: entry.into_path(),
                    dialect,
                });
            }
        }
    }
    Ok(found.into_iter().collect())
}

fn dialect_for(path: &Path, settings: &ResolvedSettings) -> Option<Dialect> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    settings.extensions.get(&ext).copied()
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|name| name.starts_with('.'))
}

/// Atomic file write: tempfile in the same directory, fsync, rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), FileError> {
    let write_error = |source| FileError::Write {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(write_error)?;
    temp.write_all(content).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_error)?;
    }
    temp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("src/b.php"), "<?php\n").unwrap();
        fs::write(root.join("src/nested/a.js"), "x;\n").unwrap();
        fs::write(root.join("src/style.css"), "a {}\n").unwrap();
        fs::write(root.join("src/readme.md"), "# hi\n").unwrap();
        fs::write(root.join(".git/hook.php"), "<?php\n").unwrap();

        let files = discover(&[root.to_path_buf()], &ResolvedSettings::default()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.path.strip_prefix(root).unwrap().display().to_string())
            .collect();
        assert_eq!(names, ["src/b.php", "src/nested/a.js", "src/style.css"]);
        assert_eq!(files[1].dialect, Dialect::Js);
    }

    #[test]
    fn test_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("view.tpl"), "<?php\n").unwrap();
        let mut settings = ResolvedSettings::default();
        assert!(discover(&[dir.path().to_path_buf()], &settings)
            .unwrap()
            .is_empty());
        settings.extensions.insert("tpl".to_string(), Dialect::Php);
        let files = discover(&[dir.path().to_path_buf()], &settings).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&[dir.path().join("nope")], &ResolvedSettings::default()).unwrap_err();
        assert!(matches!(err, FileError::Missing { .. }));
    }

    #[test]
    fn test_read_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.php");
        fs::write(&path, b"<?php \xff\n").unwrap();
        let err = read_source(&path).unwrap_err();
        assert!(matches!(err, FileError::InvalidUtf8 { valid_up_to: 6, .. }));
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.php");
        fs::write(&path, "old").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
