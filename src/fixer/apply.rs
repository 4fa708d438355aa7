//! Conflict resolution and rendering of accepted changesets.

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use super::edit::{EditOp, Proposal};
use crate::tokens::Token;

/// Result of [`select`]: indices into the proposal list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Accepted proposals in acceptance order.
    pub accepted: Vec<usize>,
    /// Proposals whose slots overlap an accepted one; retried next pass.
    pub deferred: Vec<usize>,
    /// Proposals that no longer match the token stream.
    pub rejected: Vec<usize>,
}

/// Greedily accept proposals in `(rule order, token, sequence)` order,
/// deferring any whose slots intersect an already accepted proposal.
pub fn select(proposals: &[Proposal], tokens: &[Token]) -> Selection {
    let mut order: Vec<usize> = (0..proposals.len()).collect();
    order.sort_by_key(|&i| proposals[i].sort_key());

    let mut claimed: BTreeSet<usize> = BTreeSet::new();
    let mut selection = Selection::default();
    for index in order {
        let proposal = &proposals[index];
        if !applies_to(proposal, tokens) {
            trace!(code = %proposal.code, token = proposal.token, "stale proposal rejected");
            selection.rejected.push(index);
            continue;
        }
        let slots = proposal.changeset.slots();
        if slots.iter().any(|slot| claimed.contains(slot)) {
            trace!(code = %proposal.code, token = proposal.token, "conflicting proposal deferred");
            selection.deferred.push(index);
            continue;
        }
        claimed.extend(slots);
        selection.accepted.push(index);
    }
    selection
}

fn applies_to(proposal: &Proposal, tokens: &[Token]) -> bool {
    proposal.changeset.edits().iter().all(|edit| {
        let Some(token) = tokens.get(edit.token) else {
            return false;
        };
        match (&edit.op, &edit.expected) {
            (EditOp::Replace, Some(expected)) => expected.matches(&token.text),
            _ => true,
        }
    })
}

/// Render `tokens` with the accepted changesets applied.
///
/// Insertions into one gap concatenate in acceptance order, then
/// submission order; replacing one token twice keeps the last text.
pub fn render(tokens: &[Token], proposals: &[Proposal], accepted: &[usize]) -> String {
    let mut gaps: HashMap<usize, String> = HashMap::new();
    let mut replacements: HashMap<usize, &str> = HashMap::new();
    for &index in accepted {
        for edit in proposals[index].changeset.edits() {
            match edit.op {
                EditOp::Replace => {
                    replacements.insert(edit.token, &edit.text);
                }
                EditOp::InsertBefore | EditOp::InsertAfter => {
                    gaps.entry(edit.slot() / 2).or_default().push_str(&edit.text);
                }
            }
        }
    }

    let mut out = String::new();
    for (index, token) in tokens.iter().enumerate() {
        if let Some(text) = gaps.get(&index) {
            out.push_str(text);
        }
        out.push_str(replacements.get(&index).copied().unwrap_or(&token.text));
    }
    if let Some(text) = gaps.get(&tokens.len()) {
        out.push_str(text);
    }
    out
}
