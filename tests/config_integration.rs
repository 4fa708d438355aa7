//! Integration tests for ruleset files on disk
//!
//! Tests relative includes, include cycles, version requirements and
//! errors that point back at the offending file.

use sniffwright::ruleset::schema::ValidationIssue;
use sniffwright::{
    check_source, load_from_path, Catalog, Dialect, LoadError, Resolver, RulesetError,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_relative_include_resolves_against_including_file() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "standards/common/base.toml",
        r#"
[settings]
tab_width = 2
max_passes = 7

[[rule]]
ref = "Generic.PHP"

[[rule]]
ref = "Generic.Arrays"
"#,
    );
    let team = write(
        dir.path(),
        "standards/team.toml",
        r#"
[meta]
name = "team"

[settings]
max_passes = 3

[[rule]]
ref = "common/base.toml"
exclude = ["Generic.Arrays.DisallowLongArraySyntax"]
"#,
    );

    let catalog = Catalog::builtin();
    let ruleset = Resolver::new(&catalog).resolve_reference(&team).unwrap();
    let codes: Vec<&str> = ruleset.rules().iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, ["Generic.PHP.LowerCaseKeyword"]);
    // The including file's own settings win over the included ones.
    assert_eq!(ruleset.settings().max_passes, 3);
    assert_eq!(ruleset.settings().tab_width, 2);

    let violations = check_source("<?php\nECHO array(1);\n", Dialect::Php, &ruleset);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].code, "Generic.PHP.LowerCaseKeyword.Found");
}

#[test]
fn test_include_cycle_reports_chain() {
    let dir = TempDir::new().unwrap();
    let first = write(dir.path(), "first.toml", "[[rule]]\nref = \"./second.toml\"\n");
    write(dir.path(), "second.toml", "[[rule]]\nref = \"./first.toml\"\n");

    let catalog = Catalog::builtin();
    let err = Resolver::new(&catalog).resolve_reference(&first).unwrap_err();
    match &err {
        RulesetError::IncludeCycle { chain } => {
            let hops: Vec<&str> = chain.split(" -> ").collect();
            assert_eq!(hops.len(), 3);
            assert!(hops[0].ends_with("first.toml"));
            assert!(hops[1].ends_with("second.toml"));
            assert!(hops[2].ends_with("first.toml"));
        }
        other => panic!("expected include cycle, got {other:?}"),
    }
    assert!(err.to_string().starts_with("ruleset include cycle:"));
}

#[test]
fn test_self_exclusion_is_a_cycle() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "self.toml",
        "[[rule]]\nref = \"Generic\"\nexclude = [\"./self.toml\"]\n",
    );
    let catalog = Catalog::builtin();
    let err = Resolver::new(&catalog).resolve_reference(&path).unwrap_err();
    assert!(matches!(err, RulesetError::IncludeCycle { .. }), "{err:?}");
}

#[test]
fn test_version_requirement() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "future.toml",
        r#"
[meta]
name = "future"
requires = ">=0.2, <0.4"

[[rule]]
ref = "Generic"
"#,
    );
    let catalog = Catalog::builtin();

    let err = Resolver::new(&catalog)
        .with_version("0.1.5")
        .resolve_reference(&path)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "ruleset 'future' requires version >=0.2, <0.4, this is 0.1.5"
    );

    let ruleset = Resolver::new(&catalog)
        .with_version("0.3.0")
        .resolve_reference(&path)
        .unwrap();
    assert!(!ruleset.is_empty());
}

#[test]
fn test_invalid_requirement_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "bad.toml",
        "[meta]\nrequires = \"not a version\"\n\n[[rule]]\nref = \"Generic\"\n",
    );
    let catalog = Catalog::builtin();
    let err = Resolver::new(&catalog).resolve_reference(&path).unwrap_err();
    assert!(matches!(err, RulesetError::Version(_)), "{err:?}");
}

#[test]
fn test_parse_error_carries_path() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "broken.toml", "[[rule]\nref = \"Generic\"\n");

    let err = load_from_path(&path).unwrap_err();
    match &err {
        LoadError::Toml { path: Some(p), .. } => assert!(p.ends_with("broken.toml")),
        other => panic!("expected TOML error with path, got {other:?}"),
    }
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn test_validation_error_through_include_carries_path() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "inner.toml",
        r#"
[[rule]]
ref = "Generic.PHP"
severity = 11
type = "fatal"
"#,
    );
    let outer = write(dir.path(), "outer.toml", "[[rule]]\nref = \"./inner.toml\"\n");

    let catalog = Catalog::builtin();
    let err = Resolver::new(&catalog).resolve_reference(&outer).unwrap_err();
    let RulesetError::Load(LoadError::Validation {
        path: Some(path),
        source,
    }) = &err
    else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(path.ends_with("inner.toml"));
    assert_eq!(source.issues.len(), 2);
    assert!(matches!(
        source.issues[0],
        ValidationIssue::SeverityOutOfRange { value: 11, .. }
    ));
    assert!(err.to_string().contains("inner.toml"));
}

#[test]
fn test_missing_file_reference() {
    let dir = TempDir::new().unwrap();
    let outer = write(dir.path(), "outer.toml", "[[rule]]\nref = \"./absent.toml\"\n");
    let catalog = Catalog::builtin();
    let err = Resolver::new(&catalog).resolve_reference(&outer).unwrap_err();
    assert!(matches!(err, RulesetError::Load(LoadError::Io { .. })), "{err:?}");
}

#[test]
fn test_wrong_property_type_on_rule() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "props.toml",
        r#"
[[rule]]
ref = "Generic.WhiteSpace.ScopeIndent"
[rule.properties]
indent = "wide"
"#,
    );
    let catalog = Catalog::builtin();
    let err = Resolver::new(&catalog).resolve_reference(&path).unwrap_err();
    assert_eq!(
        err.to_string(),
        "property 'indent' of rule 'Generic.WhiteSpace.ScopeIndent' expects integer, got string"
    );
}
