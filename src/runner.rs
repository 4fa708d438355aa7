//! Parallel check and fix over many files.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::annotate::AnnotatedTokens;
use crate::dispatch::{dispatch, internal_violation, DispatchOptions};
use crate::files::{atomic_write, read_source, FileError, SourceFile};
use crate::fixer::{fix, FixOptions, FixOutcome};
use crate::ruleset::Ruleset;
use crate::tokens::{Dialect, LexOptions};
use crate::violation::{Severity, Violation};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub fix: bool,
    /// Compute fixes without writing them back.
    pub dry_run: bool,
    /// Worker threads; 0 lets rayon decide.
    pub jobs: usize,
    /// Skip files not yet started once one file fails.
    pub fail_fast: bool,
    pub fix_options: FixOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct FixSummary {
    pub outcome: FixOutcome,
    pub passes: usize,
    pub fixed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub dialect: Dialect,
    pub violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixSummary>,
    /// Original and rewritten text when a fix changed the file.
    #[serde(skip)]
    pub rewrite: Option<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl FileReport {
    fn new(file: &SourceFile) -> Self {
        Self {
            path: file.path.clone(),
            dialect: file.dialect,
            violations: Vec::new(),
            fix: None,
            rewrite: None,
            error: None,
            skipped: false,
        }
    }

    pub fn errors(&self) -> usize {
        self.violations.iter().filter(|v| v.is_error()).count()
    }

    pub fn warnings(&self) -> usize {
        self.violations.len() - self.errors()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn errors(&self) -> usize {
        self.files.iter().map(FileReport::errors).sum()
    }

    pub fn warnings(&self) -> usize {
        self.files.iter().map(FileReport::warnings).sum()
    }

    pub fn fixed(&self) -> usize {
        self.files
            .iter()
            .filter_map(|f| f.fix.as_ref())
            .map(|s| s.fixed)
            .sum()
    }

    pub fn exhausted(&self) -> usize {
        self.files
            .iter()
            .filter_map(|f| f.fix.as_ref())
            .filter(|s| !s.outcome.is_converged())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }

    pub fn skipped(&self) -> usize {
        self.files.iter().filter(|f| f.skipped).count()
    }
}

/// Runs one ruleset over a set of files on a rayon pool.
pub struct Runner {
    ruleset: Arc<Ruleset>,
    options: RunOptions,
    stop: AtomicBool,
}

impl Runner {
    pub fn new(ruleset: Arc<Ruleset>, options: RunOptions) -> Self {
        Self {
            ruleset,
            options,
            stop: AtomicBool::new(false),
        }
    }

    /// Process `files`; reports come back in input order.
    pub fn run(&self, files: &[SourceFile]) -> RunReport {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if self.options.jobs > 0 {
            builder = builder.num_threads(self.options.jobs);
        }
        let files = match builder.build() {
            Ok(pool) => pool.install(|| files.par_iter().map(|f| self.process(f)).collect()),
            Err(err) => {
                warn!(%err, "could not build worker pool, using the global one");
                files.par_iter().map(|f| self.process(f)).collect()
            }
        };
        let report = RunReport { files };
        info!(
            files = report.files.len(),
            errors = report.errors(),
            warnings = report.warnings(),
            fixed = report.fixed(),
            "run finished"
        );
        report
    }

    fn process(&self, file: &SourceFile) -> FileReport {
        let mut report = FileReport::new(file);
        if self.stop.load(Ordering::Relaxed) {
            report.skipped = true;
            return report;
        }
        debug!(path = %file.path.display(), dialect = %file.dialect, "processing");

        let source = match read_source(&file.path) {
            Ok(source) => source,
            Err(FileError::InvalidUtf8 { valid_up_to, .. }) => {
                let options = DispatchOptions::for_ruleset(&self.ruleset);
                let message =
                    format!("File is not valid UTF-8 (first bad byte at offset {valid_up_to})");
                report.violations.extend(internal_violation(
                    &self.ruleset,
                    &options,
                    "Internal.InvalidUtf8",
                    Severity::Error,
                    &message,
                ));
                return report;
            }
            Err(err) => return self.fail(report, err),
        };

        if !self.options.fix {
            let settings = self.ruleset.settings();
            let lex = LexOptions::new(file.dialect).with_tab_width(settings.tab_width);
            let tokens = AnnotatedTokens::from_source(&source, lex);
            let options = DispatchOptions::for_ruleset(&self.ruleset);
            report.violations = dispatch(&tokens, &self.ruleset, &options).violations;
            return report;
        }

        let fixed = fix(&source, file.dialect, &self.ruleset, &self.options.fix_options);
        report.violations = fixed.remaining;
        report.fix = Some(FixSummary {
            outcome: fixed.outcome,
            passes: fixed.passes,
            fixed: fixed.fixed,
        });
        if fixed.source != source {
            if !self.options.dry_run {
                if let Err(err) = atomic_write(&file.path, fixed.source.as_bytes()) {
                    return self.fail(report, err);
                }
            }
            report.rewrite = Some((source, fixed.source));
        }
        report
    }

    fn fail(&self, mut report: FileReport, err: FileError) -> FileReport {
        warn!(path = %report.path.display(), %err, "file failed");
        if self.options.fail_fast {
            self.stop.store(true, Ordering::Relaxed);
        }
        report.error = Some(err.to_string());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::{Catalog, Resolver};
    use std::fs;

    fn runner(reference: &str, options: RunOptions) -> Runner {
        let catalog = Catalog::builtin();
        let ruleset = Resolver::new(&catalog).resolve_reference(reference).unwrap();
        Runner::new(Arc::new(ruleset), options)
    }

    #[test]
    fn test_check_reports_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<SourceFile> = (0..8)
            .map(|i| {
                let path = dir.path().join(format!("f{i}.php"));
                let body = if i % 2 == 0 { "<?php\nECHO 1;\n" } else { "<?php\necho 1;\n" };
                fs::write(&path, body).unwrap();
                SourceFile {
                    path,
                    dialect: Dialect::Php,
                }
            })
            .collect();
        let report = runner(
            "Generic.PHP.LowerCaseKeyword",
            RunOptions {
                jobs: 4,
                ..RunOptions::default()
            },
        )
        .run(&files);
        assert_eq!(report.files.len(), 8);
        for (i, file) in report.files.iter().enumerate() {
            assert_eq!(file.path, files[i].path);
            assert_eq!(file.errors(), usize::from(i % 2 == 0));
        }
        assert_eq!(report.errors(), 4);
    }

    #[test]
    fn test_fix_writes_unless_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.php");
        fs::write(&path, "<?php\nECHO 1;\n").unwrap();
        let file = SourceFile {
            path: path.clone(),
            dialect: Dialect::Php,
        };

        let dry = RunOptions {
            fix: true,
            dry_run: true,
            ..RunOptions::default()
        };
        let report = runner("Generic.PHP.LowerCaseKeyword", dry).run(std::slice::from_ref(&file));
        assert_eq!(report.fixed(), 1);
        assert!(report.files[0].rewrite.is_some());
        assert_eq!(fs::read_to_string(&path).unwrap(), "<?php\nECHO 1;\n");

        let real = RunOptions {
            fix: true,
            ..RunOptions::default()
        };
        let report = runner("Generic.PHP.LowerCaseKeyword", real).run(&[file]);
        assert_eq!(report.exhausted(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "<?php\necho 1;\n");
    }

    #[test]
    fn test_invalid_utf8_is_a_violation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.php");
        fs::write(&path, b"<?php \xfe\n").unwrap();
        let report = runner("Generic", RunOptions::default()).run(&[SourceFile {
            path,
            dialect: Dialect::Php,
        }]);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.files[0].violations[0].code, "Internal.InvalidUtf8");
        assert_eq!(report.errors(), 1);
    }

    #[test]
    fn test_fail_fast_skips_remaining_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = vec![SourceFile {
            path: dir.path().join("missing.php"),
            dialect: Dialect::Php,
        }];
        for i in 0..3 {
            let path = dir.path().join(format!("ok{i}.php"));
            fs::write(&path, "<?php\n").unwrap();
            files.push(SourceFile {
                path,
                dialect: Dialect::Php,
            });
        }
        let options = RunOptions {
            jobs: 1,
            fail_fast: true,
            ..RunOptions::default()
        };
        let report = runner("Generic", options).run(&files);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 3);
    }
}
