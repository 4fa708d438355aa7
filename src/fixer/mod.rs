//! Iterative autofix.
//!
//! Each pass lexes and annotates the current text, dispatches with fixing
//! enabled, selects a conflict-free subset of the proposed changesets and
//! renders them. The loop ends when a pass proposes nothing, or with an
//! [`ExhaustionReason`] when it cannot make further progress.

mod apply;
mod edit;

pub use apply::{render, select, Selection};
pub use edit::{Changeset, EditOp, EditVerification, Proposal, TokenEdit};

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::annotate::AnnotatedTokens;
use crate::dispatch::{dispatch, DispatchOptions};
use crate::ruleset::Ruleset;
use crate::tokens::{Dialect, LexOptions};
use crate::violation::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixOptions {
    /// Overrides the ruleset's `max_passes`.
    pub max_passes: Option<usize>,
    /// Wall-clock budget for the whole file.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionReason {
    PassLimit,
    Deadline,
    /// Fixable violations remain but no edit could be applied.
    Stalled,
    /// The text came back to the content of an earlier pass.
    Oscillation,
}

impl fmt::Display for ExhaustionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExhaustionReason::PassLimit => "pass limit reached",
            ExhaustionReason::Deadline => "deadline exceeded",
            ExhaustionReason::Stalled => "no applicable fix",
            ExhaustionReason::Oscillation => "fixes oscillate",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixOutcome {
    Converged,
    Exhausted(ExhaustionReason),
}

impl FixOutcome {
    pub fn is_converged(self) -> bool {
        self == FixOutcome::Converged
    }
}

#[derive(Debug, Clone)]
pub struct FixReport {
    pub source: String,
    pub outcome: FixOutcome,
    /// Dispatch passes run, including the final verifying one.
    pub passes: usize,
    /// Changesets applied across all passes.
    pub fixed: usize,
    /// Violations reported by the last pass.
    pub remaining: Vec<Violation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Tokenizing,
    Dispatching,
    Applying,
    Converged,
    Exhausted,
}

struct Machine {
    state: State,
}

impl Machine {
    fn enter(&mut self, next: State) {
        trace!(from = ?self.state, to = ?next, "fixer state");
        self.state = next;
    }
}

/// Fix `source` until no rule proposes an edit, or a bound is hit.
pub fn fix(source: &str, dialect: Dialect, ruleset: &Ruleset, options: &FixOptions) -> FixReport {
    let started = Instant::now();
    let settings = ruleset.settings();
    let max_passes = options.max_passes.unwrap_or(settings.max_passes).max(1);
    let lex = LexOptions::new(dialect).with_tab_width(settings.tab_width);
    let dispatch_options = DispatchOptions::for_ruleset(ruleset).with_fixing(true);

    let mut machine = Machine { state: State::Idle };
    let mut current = source.to_string();
    let mut seen: HashSet<u64> = HashSet::from([xxh3_64(current.as_bytes())]);
    let mut passes = 0;
    let mut fixed = 0;

    let (outcome, remaining) = loop {
        machine.enter(State::Tokenizing);
        let tokens = AnnotatedTokens::from_source(&current, lex);

        machine.enter(State::Dispatching);
        passes += 1;
        let result = dispatch(&tokens, ruleset, &dispatch_options);

        if result.proposals.is_empty() {
            if result.fixable() == 0 {
                break (FixOutcome::Converged, result.violations);
            }
            break (stop(ExhaustionReason::Stalled), result.violations);
        }
        if passes >= max_passes {
            break (stop(ExhaustionReason::PassLimit), result.violations);
        }
        if options.timeout.is_some_and(|limit| started.elapsed() >= limit) {
            break (stop(ExhaustionReason::Deadline), result.violations);
        }

        machine.enter(State::Applying);
        let selection = select(&result.proposals, tokens.tokens());
        debug!(
            pass = passes,
            proposals = result.proposals.len(),
            accepted = selection.accepted.len(),
            deferred = selection.deferred.len(),
            rejected = selection.rejected.len(),
            "fix pass"
        );
        if selection.accepted.is_empty() {
            break (stop(ExhaustionReason::Stalled), result.violations);
        }

        let next = render(tokens.tokens(), &result.proposals, &selection.accepted);
        if next == current {
            break (stop(ExhaustionReason::Stalled), result.violations);
        }
        if !seen.insert(xxh3_64(next.as_bytes())) {
            break (stop(ExhaustionReason::Oscillation), result.violations);
        }
        fixed += selection.accepted.len();
        current = next;
    };

    machine.enter(match outcome {
        FixOutcome::Converged => State::Converged,
        FixOutcome::Exhausted(_) => State::Exhausted,
    });

    FixReport {
        source: current,
        outcome,
        passes,
        fixed,
        remaining,
    }
}

fn stop(reason: ExhaustionReason) -> FixOutcome {
    warn!(%reason, "fixer exhausted");
    FixOutcome::Exhausted(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::{load_from_str, Catalog, Resolver};
    use crate::sniff::{Sniff, SniffContext, SniffFlow};
    use crate::tokens::TokenKind;
    use std::sync::Arc;

    /// Flips every identifier between `a` and `b`.
    struct Flip;

    impl Sniff for Flip {
        fn code(&self) -> &'static str {
            "Test.Loop.Flip"
        }

        fn description(&self) -> &'static str {
            "flips identifiers"
        }

        fn register(&self) -> &'static [TokenKind] {
            &[TokenKind::Identifier]
        }

        fn process(&self, ctx: &mut SniffContext<'_>, index: usize) -> SniffFlow {
            let text = ctx.tokens().text(index).to_string();
            let next = if text == "a" { "b" } else { "a" };
            ctx.add_fixable_error(index, "Found", "flip", |cs| {
                cs.replace(index, &text, next);
            });
            SniffFlow::Continue
        }
    }

    /// Reports a fixable error but never proposes an edit.
    struct Stuck;

    impl Sniff for Stuck {
        fn code(&self) -> &'static str {
            "Test.Loop.Stuck"
        }

        fn description(&self) -> &'static str {
            "never fixes"
        }

        fn register(&self) -> &'static [TokenKind] {
            &[TokenKind::Identifier]
        }

        fn process(&self, ctx: &mut SniffContext<'_>, index: usize) -> SniffFlow {
            ctx.add_fixable_error(index, "Found", "stuck", |_| {});
            SniffFlow::Continue
        }
    }

    fn ruleset(reference: &str) -> Ruleset {
        let catalog = Catalog::builtin()
            .with_sniff(Arc::new(Flip))
            .with_sniff(Arc::new(Stuck));
        let toml = format!("[[rule]]\nref = \"{reference}\"\n");
        Resolver::new(&catalog)
            .resolve(&load_from_str(&toml).unwrap())
            .unwrap()
    }

    #[test]
    fn test_oscillation_is_detected() {
        let report = fix("a;", Dialect::Js, &ruleset("Test.Loop.Flip"), &FixOptions::default());
        assert_eq!(
            report.outcome,
            FixOutcome::Exhausted(ExhaustionReason::Oscillation)
        );
        assert_eq!(report.source, "b;");
        assert_eq!(report.passes, 2);
    }

    #[test]
    fn test_stalled_without_edits() {
        let report = fix("a;", Dialect::Js, &ruleset("Test.Loop.Stuck"), &FixOptions::default());
        assert_eq!(report.outcome, FixOutcome::Exhausted(ExhaustionReason::Stalled));
        assert_eq!(report.passes, 1);
        assert_eq!(report.remaining.len(), 1);
        assert_eq!(report.source, "a;");
    }

    #[test]
    fn test_pass_limit() {
        let options = FixOptions {
            max_passes: Some(1),
            timeout: None,
        };
        let report = fix("a;", Dialect::Js, &ruleset("Test.Loop.Flip"), &options);
        assert_eq!(report.outcome, FixOutcome::Exhausted(ExhaustionReason::PassLimit));
        assert_eq!(report.source, "a;");
    }

    #[test]
    fn test_deadline() {
        let options = FixOptions {
            max_passes: None,
            timeout: Some(Duration::ZERO),
        };
        let report = fix("a;", Dialect::Js, &ruleset("Test.Loop.Flip"), &options);
        assert_eq!(report.outcome, FixOutcome::Exhausted(ExhaustionReason::Deadline));
    }

    #[test]
    fn test_converges_on_keywords() {
        let report = fix(
            "<?php\nIF ($a) {\n    ECHO 1;\n}\n",
            Dialect::Php,
            &ruleset("Generic.PHP.LowerCaseKeyword"),
            &FixOptions::default(),
        );
        assert!(report.outcome.is_converged());
        assert_eq!(report.source, "<?php\nif ($a) {\n    echo 1;\n}\n");
        assert_eq!(report.fixed, 2);
        assert_eq!(report.passes, 2);
        assert!(report.remaining.is_empty());
    }
}
