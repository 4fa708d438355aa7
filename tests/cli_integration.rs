//! Integration tests for the command-line interface
//!
//! Runs the built binary against temporary trees and checks exit codes,
//! output formats and file rewrites.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn sniffwright(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sniffwright"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, body) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, body).unwrap();
    }
    dir
}

#[test]
fn test_check_help() {
    let dir = TempDir::new().unwrap();
    let output = sniffwright(&["check", "--help"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Report violations without changing files"));
}

#[test]
fn test_check_clean_tree_exits_zero() {
    let dir = workspace(&[("src/a.php", "<?php\necho 1;\n"), ("notes.txt", "IF\tELSE\n")]);
    let output = sniffwright(&["check", "src"], dir.path());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "{stdout}");
    assert!(stdout.contains("Summary:"));
    assert!(stdout.contains("1 files"));
}

#[test]
fn test_check_warnings_only_exits_one() {
    let long = format!("<?php\n$a = '{}';\n", "x".repeat(130));
    let dir = workspace(&[("long.php", &long)]);
    let output = sniffwright(&["check", "long.php"], dir.path());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1), "{stdout}");
    assert!(stdout.contains("Generic.Files.LineLength.TooLong"));
}

#[test]
fn test_check_errors_exit_two() {
    let dir = workspace(&[("a.php", "<?php\nECHO 1;\n")]);
    let output = sniffwright(&["check", "."], dir.path());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(2), "{stdout}");
    assert!(stdout.contains("FILE:"));
    assert!(stdout.contains("Generic.PHP.LowerCaseKeyword.Found"));
    // The file on disk is untouched by check.
    assert_eq!(
        fs::read_to_string(dir.path().join("a.php")).unwrap(),
        "<?php\nECHO 1;\n"
    );
}

#[test]
fn test_check_json_format() {
    let dir = workspace(&[("a.php", "<?php\nECHO 1;\n"), ("b.php", "<?php\necho 1;\n")]);
    let output = sniffwright(&["check", "--format", "json", "."], dir.path());

    assert_eq!(output.status.code(), Some(2));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["totals"]["files"], 2);
    assert_eq!(json["totals"]["errors"], 1);
    assert_eq!(json["totals"]["warnings"], 0);

    let files = json["files"].as_array().unwrap();
    let first = &files[0];
    assert!(first["path"].as_str().unwrap().ends_with("a.php"));
    assert_eq!(first["dialect"], "php");
    let violation = &first["violations"][0];
    assert_eq!(violation["code"], "Generic.PHP.LowerCaseKeyword.Found");
    assert_eq!(violation["severity"], "error");
    assert_eq!(violation["line"], 2);
    assert_eq!(violation["column"], 1);
    assert_eq!(violation["fixable"], true);
    assert!(files[1]["violations"].as_array().unwrap().is_empty());
}

#[test]
fn test_fix_dry_run_leaves_files() {
    let dir = workspace(&[("a.php", "<?php\nIF($a){\n\tECHO 1;}\n")]);
    let output = sniffwright(&["fix", "--dry-run", "--diff", "."], dir.path());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "{stdout}");
    assert!(stdout.contains("[DRY RUN - no files written]"));
    assert!(stdout.contains("Would fix 6"));
    assert!(stdout.contains("+if ($a) {"));
    assert!(stdout.contains("-IF($a){"));
    assert_eq!(
        fs::read_to_string(dir.path().join("a.php")).unwrap(),
        "<?php\nIF($a){\n\tECHO 1;}\n"
    );
}

#[test]
fn test_fix_writes_and_recheck_is_clean() {
    let dir = workspace(&[("web/app.js", "if(x){y();}\n"), ("web/site.css", "a { color:red; }\n")]);
    let output = sniffwright(
        &["fix", "--standard", "Squiz", "web"],
        dir.path(),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "{stdout}");
    assert!(stdout.contains("Fixed"));

    assert_eq!(
        fs::read_to_string(dir.path().join("web/app.js")).unwrap(),
        "if (x) {\n    y();\n}\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("web/site.css")).unwrap(),
        "a { color: red; }\n"
    );

    let output = sniffwright(&["check", "--standard", "Squiz", "web"], dir.path());
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_fix_pass_limit_is_reported() {
    let dir = workspace(&[("a.js", "if(x){y();}\n")]);
    let output = sniffwright(
        &["fix", "--standard", "Squiz", "--max-passes", "1", "a.js"],
        dir.path(),
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pass limit reached"), "{stdout}");
    assert!(stdout.contains("1 not converged"));
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        fs::read_to_string(dir.path().join("a.js")).unwrap(),
        "if(x){y();}\n"
    );
}

#[test]
fn test_list_psr12() {
    let dir = TempDir::new().unwrap();
    let output = sniffwright(&["list"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PSR12"));
    assert!(stdout.contains("Generic.Files.LineLength"));
    assert!(stdout.contains("line_limit = 120"));
    assert!(stdout.contains("Squiz.ControlStructures.ControlSignature"));
    assert!(!stdout.contains("Squiz.CSS.ColonSpacing"));
}

#[test]
fn test_unknown_standard_suggests_and_exits_three() {
    let dir = workspace(&[("a.php", "<?php\n")]);
    let output = sniffwright(&["check", "--standard", "PSR13", "."], dir.path());

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("unknown rule reference 'PSR13'"));
    assert!(stderr.contains("did you mean 'PSR12'?"));
}

#[test]
fn test_ruleset_file_as_standard() {
    let dir = workspace(&[
        (
            "ruleset.toml",
            "[[rule]]\nref = \"Generic.WhiteSpace.ScopeIndent\"\n[rule.properties]\nindent = 2\n",
        ),
        ("a.js", "if (a) {\n  b();\n}\n"),
    ]);
    let output = sniffwright(&["check", "--standard", "ruleset.toml", "a.js"], dir.path());
    assert_eq!(output.status.code(), Some(0));

    let output = sniffwright(&["check", "a.js", "--standard", "Generic"], dir.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_path_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let output = sniffwright(&["check", "nope"], dir.path());

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not collect files"));
}
