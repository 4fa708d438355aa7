//! Inline suppression directives.
//!
//! Comments of the form `sniff:disable`, `sniff:enable`, `sniff:ignore` and
//! `sniff:ignore-file`, optionally followed by codes, switch reporting off
//! for a region of the file. Codes match by dotted prefix, so
//! `Generic.Files` covers every code under that category. Anything after
//! `--` in the comment is free text.

use crate::annotate::AnnotatedTokens;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    Disable(Vec<String>),
    Enable(Vec<String>),
    Ignore(Vec<String>),
    IgnoreFile,
}

/// Suppression state of one token stream.
#[derive(Debug, Clone, Default)]
pub struct Suppressions {
    ignore_file: bool,
    /// `(line, directive)` in source order; each applies from its line on.
    regions: Vec<(usize, Directive)>,
    /// `(line, codes)`; an empty code list covers everything.
    ignored_lines: Vec<(usize, Vec<String>)>,
}

impl Suppressions {
    pub fn scan(tokens: &AnnotatedTokens) -> Self {
        let mut out = Suppressions::default();
        for (index, token) in tokens.tokens().iter().enumerate() {
            if !token.kind.is_comment() {
                continue;
            }
            let Some(directive) = parse_directive(&token.text) else {
                continue;
            };
            match directive {
                Directive::IgnoreFile => out.ignore_file = true,
                Directive::Ignore(codes) => {
                    let standalone = tokens.first_content_on_line(index) == index;
                    let line = if standalone {
                        token.line + token.text.matches('\n').count() + 1
                    } else {
                        token.line
                    };
                    out.ignored_lines.push((line, codes));
                }
                other => out.regions.push((token.line, other)),
            }
        }
        out
    }

    pub fn ignores_file(&self) -> bool {
        self.ignore_file
    }

    pub fn is_empty(&self) -> bool {
        !self.ignore_file && self.regions.is_empty() && self.ignored_lines.is_empty()
    }

    /// Whether a violation with `code` on `line` is switched off.
    pub fn is_suppressed(&self, line: usize, code: &str) -> bool {
        if self.ignore_file {
            return true;
        }
        let ignored = self
            .ignored_lines
            .iter()
            .any(|(l, codes)| *l == line && covers_any(codes, code));
        ignored || self.disabled_at(line, code)
    }

    fn disabled_at(&self, line: usize, code: &str) -> bool {
        let mut all = false;
        let mut disabled: Vec<&str> = Vec::new();
        let mut exceptions: Vec<&str> = Vec::new();

        for (_, directive) in self.regions.iter().take_while(|(l, _)| *l <= line) {
            match directive {
                Directive::Disable(codes) if codes.is_empty() => {
                    all = true;
                    disabled.clear();
                    exceptions.clear();
                }
                Directive::Disable(codes) => {
                    exceptions.retain(|e| !codes.iter().any(|c| prefix_matches(c, e)));
                    disabled.extend(codes.iter().map(String::as_str));
                }
                Directive::Enable(codes) if codes.is_empty() => {
                    all = false;
                    disabled.clear();
                    exceptions.clear();
                }
                Directive::Enable(codes) => {
                    disabled.retain(|d| !codes.iter().any(|c| prefix_matches(c, d)));
                    for c in codes {
                        if all || disabled.iter().any(|d| prefix_matches(d, c)) {
                            exceptions.push(c);
                        }
                    }
                }
                Directive::Ignore(_) | Directive::IgnoreFile => {}
            }
        }

        let off = all || disabled.iter().any(|d| prefix_matches(d, code));
        off && !exceptions.iter().any(|e| prefix_matches(e, code))
    }
}

/// `pattern` equals `code` or is one of its dotted prefixes.
fn prefix_matches(pattern: &str, code: &str) -> bool {
    code == pattern
        || (code.len() > pattern.len()
            && code.starts_with(pattern)
            && code.as_bytes()[pattern.len()] == b'.')
}

fn covers_any(codes: &[String], code: &str) -> bool {
    codes.is_empty() || codes.iter().any(|c| prefix_matches(c, code))
}

fn parse_directive(comment: &str) -> Option<Directive> {
    let body = comment
        .trim()
        .trim_end_matches("*/")
        .trim_start_matches(['/', '#', '*', '!'])
        .trim_start();
    let rest = body.strip_prefix("sniff:")?;
    let rest = rest.split("--").next().unwrap_or_default();
    let mut words = rest.split(|c: char| c == ',' || c.is_whitespace()).filter(|w| !w.is_empty());
    let name = words.next()?;
    let codes: Vec<String> = words
        .take_while(|w| !w.starts_with("*/"))
        .map(str::to_string)
        .collect();
    match name {
        "disable" => Some(Directive::Disable(codes)),
        "enable" => Some(Directive::Enable(codes)),
        "ignore" => Some(Directive::Ignore(codes)),
        "ignore-file" => Some(Directive::IgnoreFile),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{Dialect, LexOptions};

    fn scan(source: &str) -> Suppressions {
        Suppressions::scan(&AnnotatedTokens::from_source(
            source,
            LexOptions::new(Dialect::Php),
        ))
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            parse_directive("// sniff:disable Generic.Files, Squiz -- legacy"),
            Some(Directive::Disable(vec![
                "Generic.Files".to_string(),
                "Squiz".to_string()
            ]))
        );
        assert_eq!(parse_directive("/* sniff:enable */"), Some(Directive::Enable(vec![])));
        assert_eq!(parse_directive("# sniff:ignore-file"), Some(Directive::IgnoreFile));
        assert_eq!(parse_directive("// sniff: nothing"), None);
        assert_eq!(parse_directive("// plain comment"), None);
    }

    #[test]
    fn test_prefix_matches() {
        assert!(prefix_matches("Generic", "Generic.Files.LineLength.TooLong"));
        assert!(prefix_matches("Generic.Files.LineLength.TooLong", "Generic.Files.LineLength.TooLong"));
        assert!(!prefix_matches("Generic.File", "Generic.Files.LineLength.TooLong"));
    }

    #[test]
    fn test_disable_enable_region() {
        let s = scan("<?php\n// sniff:disable\n$a;\n// sniff:enable\n$b;\n");
        assert!(!s.is_suppressed(1, "Generic.PHP.LowerCaseKeyword.Found"));
        assert!(s.is_suppressed(3, "Generic.PHP.LowerCaseKeyword.Found"));
        assert!(!s.is_suppressed(5, "Generic.PHP.LowerCaseKeyword.Found"));
    }

    #[test]
    fn test_enable_exception() {
        let s = scan("<?php\n// sniff:disable Generic\n// sniff:enable Generic.Files\n$a;\n");
        assert!(s.is_suppressed(4, "Generic.PHP.LowerCaseKeyword.Found"));
        assert!(!s.is_suppressed(4, "Generic.Files.LineLength.TooLong"));
        assert!(!s.is_suppressed(4, "Squiz.CSS.ColonSpacing.Before"));
    }

    #[test]
    fn test_ignore_next_and_same_line() {
        let s = scan("<?php\n// sniff:ignore Generic.Files\n$a;\n$b; // sniff:ignore\n$c;\n");
        assert!(s.is_suppressed(3, "Generic.Files.LineLength.TooLong"));
        assert!(!s.is_suppressed(3, "Generic.PHP.LowerCaseKeyword.Found"));
        assert!(s.is_suppressed(4, "Generic.PHP.LowerCaseKeyword.Found"));
        assert!(!s.is_suppressed(5, "Generic.PHP.LowerCaseKeyword.Found"));
    }

    #[test]
    fn test_ignore_file() {
        let s = scan("<?php\n$a;\n/* sniff:ignore-file */\n");
        assert!(s.ignores_file());
        assert!(s.is_suppressed(1, "Anything.At.All.Code"));
    }

    #[test]
    fn test_no_directives() {
        assert!(scan("<?php\n// regular\n$a;\n").is_empty());
    }
}
