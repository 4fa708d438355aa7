//! Single-pass listener dispatch over an annotated token stream.

use tracing::trace;

use crate::annotate::AnnotatedTokens;
use crate::fixer::Proposal;
use crate::ruleset::Ruleset;
use crate::sniff::{PropertyBag, SniffContext, SniffFlow, DEFAULT_LEVEL};
use crate::suppress::Suppressions;
use crate::tokens::{Dialect, TokenKind};
use crate::violation::{Severity, Violation};

/// Per-run switches for [`dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Run fix closures and collect proposals.
    pub fixing: bool,
    /// Minimum level for errors to be reported; 0 hides all errors.
    pub error_severity: u8,
    /// Minimum level for warnings to be reported; 0 hides all warnings.
    pub warning_severity: u8,
}

impl DispatchOptions {
    pub fn for_ruleset(ruleset: &Ruleset) -> Self {
        let settings = ruleset.settings();
        Self {
            fixing: false,
            error_severity: settings.error_severity,
            warning_severity: settings.warning_severity,
        }
    }

    pub fn with_fixing(mut self, fixing: bool) -> Self {
        self.fixing = fixing;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    /// Ordered by token, then rule registration order.
    pub violations: Vec<Violation>,
    pub proposals: Vec<Proposal>,
}

impl DispatchOutcome {
    pub fn errors(&self) -> usize {
        self.violations.iter().filter(|v| v.is_error()).count()
    }

    pub fn warnings(&self) -> usize {
        self.violations.len() - self.errors()
    }

    pub fn fixable(&self) -> usize {
        self.violations.iter().filter(|v| v.fixable).count()
    }
}

/// Collects what sniffs report during one dispatch.
#[derive(Debug, Default)]
pub(crate) struct Sink {
    entries: Vec<(usize, Violation)>,
    pub(crate) proposals: Vec<Proposal>,
    seq: usize,
}

impl Sink {
    pub(crate) fn push(&mut self, rule_order: usize, violation: Violation) {
        self.entries.push((rule_order, violation));
    }

    pub(crate) fn next_seq(&mut self) -> usize {
        self.seq += 1;
        self.seq
    }

    fn finish(mut self) -> DispatchOutcome {
        self.entries
            .sort_by_key(|(order, violation)| (violation.token, *order));
        DispatchOutcome {
            violations: self.entries.into_iter().map(|(_, v)| v).collect(),
            proposals: self.proposals,
        }
    }
}

/// Run every rule listening for each token's resolved kind, in token order
/// and then registration order.
pub fn dispatch(
    tokens: &AnnotatedTokens,
    ruleset: &Ruleset,
    options: &DispatchOptions,
) -> DispatchOutcome {
    let suppressions = Suppressions::scan(tokens);
    let mut sink = Sink::default();
    if suppressions.ignores_file() {
        trace!("file ignored by directive");
        return sink.finish();
    }

    if tokens.dialect() == Dialect::Php && !has_code(tokens) {
        if let Some(violation) = internal_violation(
            ruleset,
            options,
            "Internal.NoCodeFound",
            Severity::Warning,
            "No PHP code was found in this file",
        ) {
            sink.push(0, violation);
        }
    }

    let rules = ruleset.rules();
    let mut bags: Vec<PropertyBag> = rules.iter().map(|rule| rule.properties.clone()).collect();
    // A rule ignores its registrations before `resume[i]`.
    let mut resume: Vec<usize> = vec![0; rules.len()];
    let dialect = tokens.dialect();

    for index in 0..tokens.len() {
        for &order in ruleset.listeners(dialect, tokens.kind(index)) {
            if index < resume[order] {
                continue;
            }
            let rule = &rules[order];
            let mut ctx = SniffContext::new(
                tokens,
                &mut bags[order],
                rule,
                order,
                ruleset,
                &suppressions,
                options,
                &mut sink,
            );
            match rule.sniff.process(&mut ctx, index) {
                SniffFlow::Continue => {}
                SniffFlow::SkipTo(next) => resume[order] = next,
                SniffFlow::SkipFile => resume[order] = usize::MAX,
            }
        }
    }

    sink.finish()
}

fn has_code(tokens: &AnnotatedTokens) -> bool {
    let tokens = tokens.tokens();
    tokens.is_empty()
        || tokens
            .iter()
            .all(|t| t.kind == TokenKind::InlineHtml && t.text.trim().is_empty())
        || tokens
            .iter()
            .any(|t| matches!(t.kind, TokenKind::OpenTag | TokenKind::OpenTagWithEcho))
}

/// A violation raised by the engine itself, anchored at the start of the
/// file. Honors exclusions, code overrides and thresholds.
pub fn internal_violation(
    ruleset: &Ruleset,
    options: &DispatchOptions,
    code: &str,
    severity: Severity,
    message: &str,
) -> Option<Violation> {
    if ruleset.is_code_excluded(code) {
        return None;
    }
    let by_code = ruleset.code_override(code);
    let level = by_code.and_then(|o| o.severity).unwrap_or(DEFAULT_LEVEL);
    let severity = by_code.and_then(|o| o.kind).unwrap_or(severity);
    let threshold = match severity {
        Severity::Error => options.error_severity,
        Severity::Warning => options.warning_severity,
    };
    if level == 0 || threshold == 0 || level < threshold {
        return None;
    }
    Some(Violation {
        line: 1,
        column: 1,
        token: 0,
        code: code.to_string(),
        severity,
        level,
        message: by_code
            .and_then(|o| o.message.clone())
            .unwrap_or_else(|| message.to_string()),
        fixable: false,
    })
}
