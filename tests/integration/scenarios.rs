use sniffwright::fixer::FixOutcome;
use sniffwright::{check_source, fix, AnnotatedTokens, Dialect, FixOptions, LexOptions};

use super::ruleset;

#[test]
fn test_brace_and_keyword_spacing_converge() {
    let ruleset = ruleset(
        r#"
[[rule]]
ref = "Squiz.ControlStructures.ControlSignature"

[[rule]]
ref = "Squiz.WhiteSpace.ScopeClosingBrace"
"#,
    );
    let report = fix("if(x){y();}\n", Dialect::Js, &ruleset, &FixOptions::default());

    assert_eq!(report.source, "if (x) {\n    y();\n}\n");
    assert_eq!(report.outcome, FixOutcome::Converged);
    // One rewriting pass plus the pass that finds nothing left to do.
    assert_eq!(report.passes, 2);
    assert_eq!(report.fixed, 4);
    assert!(report.remaining.is_empty());
}

#[test]
fn test_unmatched_closing_brace_is_tolerated() {
    let source = "<?php\n}\nIF ($a) {\n    foo();\n}\n";
    let tokens = AnnotatedTokens::from_source(source, LexOptions::new(Dialect::Php));
    let stray = tokens
        .tokens()
        .iter()
        .position(|t| t.text == "}")
        .expect("brace present");
    assert!(tokens.annotation(stray).unmatched);
    assert_eq!(tokens.annotation(stray).bracket_partner, None);

    let ruleset = ruleset(
        r#"
[[rule]]
ref = "PSR12"
"#,
    );
    let violations = check_source(source, Dialect::Php, &ruleset);
    let codes: Vec<&str> = violations.iter().map(|v| v.code.as_str()).collect();
    // Dispatch still runs on the rest of the file.
    assert_eq!(codes, ["Generic.PHP.LowerCaseKeyword.Found"]);
    assert!(violations.iter().all(|v| v.token != stray));
}

#[test]
fn test_reinclude_after_exclusion_with_property() {
    let ruleset = ruleset(
        r#"
[[rule]]
ref = "Generic"
exclude = ["Generic.WhiteSpace.ScopeIndent"]

[[rule]]
ref = "Generic.WhiteSpace.ScopeIndent"
[rule.properties]
indent = 2
"#,
    );
    let matching: Vec<_> = ruleset
        .rules()
        .iter()
        .filter(|r| r.code == "Generic.WhiteSpace.ScopeIndent")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].properties.int("indent"), 2);

    let violations = check_source("if (a) {\n  b();\n}\n", Dialect::Js, &ruleset);
    assert!(violations.is_empty(), "{violations:?}");
}

#[test]
fn test_conflicting_edits_first_rule_wins_then_converges() {
    let ruleset = ruleset(
        r#"
[[rule]]
ref = "Generic.WhiteSpace.ScopeIndent"

[[rule]]
ref = "Generic.WhiteSpace.DisallowTabIndent"
"#,
    );
    let source = "<?php\nif ($a) {\n\t\tfoo();\n}\n";

    let first = check_source(source, Dialect::Php, &ruleset);
    let codes: Vec<&str> = first.iter().map(|v| v.code.as_str()).collect();
    assert_eq!(
        codes,
        [
            "Generic.WhiteSpace.DisallowTabIndent.TabsUsed",
            "Generic.WhiteSpace.ScopeIndent.Incorrect",
        ]
    );

    let report = fix(source, Dialect::Php, &ruleset, &FixOptions::default());
    // The indentation rule's replacement wins the shared token; the tab
    // rule's trigger is gone on the next pass.
    assert_eq!(report.source, "<?php\nif ($a) {\n    foo();\n}\n");
    assert_eq!(report.outcome, FixOutcome::Converged);
    assert_eq!(report.fixed, 1);
    assert_eq!(report.passes, 2);
}

#[test]
fn test_standard_property_with_rule_override() {
    let ruleset = ruleset(
        r#"
[[rule]]
ref = "PSR12"
[rule.properties]
indent = 2

[[rule]]
ref = "Squiz.ControlStructures.ControlSignature"
[rule.properties]
indent = 8
"#,
    );
    let indent = |code: &str| {
        ruleset
            .rule(code)
            .map(|r| r.properties.int("indent"))
            .expect("rule enabled")
    };
    assert_eq!(indent("Squiz.ControlStructures.ControlSignature"), 8);
    assert_eq!(indent("Generic.WhiteSpace.ScopeIndent"), 2);
}

#[test]
fn test_psr12_fix_of_small_file() {
    let ruleset = ruleset("[[rule]]\nref = \"PSR12\"\n");
    let report = fix(
        "<?php\nIF($a){\n\tECHO 1;}\n",
        Dialect::Php,
        &ruleset,
        &FixOptions::default(),
    );
    assert_eq!(report.source, "<?php\nif ($a) {\n    echo 1;\n}\n");
    assert!(report.outcome.is_converged());
    assert_eq!(report.fixed, 6);
}

#[test]
fn test_suppression_survives_fix_passes() {
    let ruleset = ruleset("[[rule]]\nref = \"Generic.PHP.LowerCaseKeyword\"\n");
    let source = "<?php\n// sniff:ignore Generic.PHP\nECHO 1;\nECHO 2;\n";
    let report = fix(source, Dialect::Php, &ruleset, &FixOptions::default());
    assert_eq!(report.source, "<?php\n// sniff:ignore Generic.PHP\nECHO 1;\necho 2;\n");
}

#[test]
fn test_severity_threshold_filters_reports() {
    let ruleset = ruleset(
        r#"
[settings]
warning_severity = 6

[[rule]]
ref = "Generic.Files.LineLength"
[rule.properties]
line_limit = 5
absolute_line_limit = 0
"#,
    );
    assert!(check_source("abcdefgh;\n", Dialect::Js, &ruleset).is_empty());
}
