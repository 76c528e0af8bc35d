//! Recursive reconstruction of a secret from contributed share tokens

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::domain::{
    FieldElement, LineageId, ParticipantId, RecoveryContribution, ShareIndex, ShareMap, ShareToken,
};
use crate::error::{RecoveryError, Result};
use crate::hierarchy::{Gate, Hierarchy, HierarchyNode};
use crate::primitive::ThresholdScheme;
use crate::recoverable::is_recoverable;

/// Reconstructs the secret split through `hierarchy`
///
/// Runs the structural quorum check first so that insufficient share sets are
/// rejected without touching the threshold primitive.
///
/// # Errors
/// - [`RecoveryError::UnknownParticipant`] if a share names someone outside the hierarchy
/// - [`RecoveryError::InsufficientShares`] if the participants cannot satisfy the root
/// - [`RecoveryError::MismatchedShareLineage`] if shares from different splits meet at a gate
/// - [`RecoveryError::MalformedShareEncoding`] if token depths disagree with the tree
/// - any error of the threshold primitive
pub fn reconstruct<S: ThresholdScheme + ?Sized>(
    scheme: &S,
    shares: &ShareMap,
    hierarchy: &Hierarchy,
) -> Result<FieldElement> {
    if let Some(unknown) = shares.keys().find(|name| !hierarchy.contains(name)) {
        return Err(RecoveryError::UnknownParticipant(unknown.clone()).into());
    }

    let available: BTreeSet<ParticipantId> = shares.keys().cloned().collect();
    if !is_recoverable(&available, hierarchy.root()) {
        debug!(available = available.len(), "share set cannot satisfy hierarchy");
        return Err(RecoveryError::InsufficientShares.into());
    }

    let contribution =
        decode(scheme, shares, hierarchy.root())?.ok_or(RecoveryError::InsufficientShares)?;

    if !contribution.remaining_indices.is_empty() {
        return Err(RecoveryError::MalformedShareEncoding(format!(
            "{} unused share indices left at the root",
            contribution.remaining_indices.len()
        ))
        .into());
    }

    debug!(participants = shares.len(), "reconstructed secret");
    Ok(contribution.value)
}

/// Where a satisfied child's contribution lives
#[derive(Clone, Copy)]
enum Source<'a> {
    Leaf(&'a ShareToken),
    /// Slot in the gate's list of decoded sub-gate results
    Gate(usize),
}

/// A child's value with the current gate's index split off its index chain
struct Candidate<'a> {
    index: ShareIndex,
    value: &'a FieldElement,
    remaining: &'a [ShareIndex],
    lineage: LineageId,
}

impl<'a> Candidate<'a> {
    fn new(
        value: &'a FieldElement,
        indices: &'a [ShareIndex],
        lineage: LineageId,
    ) -> std::result::Result<Self, RecoveryError> {
        let (&index, remaining) = indices.split_first().ok_or_else(|| {
            RecoveryError::MalformedShareEncoding("share token has too few indices".into())
        })?;
        Ok(Self {
            index,
            value,
            remaining,
            lineage,
        })
    }

    fn same_lineage(&self, other: &Self) -> bool {
        self.lineage == other.lineage && self.remaining == other.remaining
    }
}

/// Decodes `gate` from whatever shares are present beneath it
///
/// Returns `Ok(None)` when fewer than `threshold` children can contribute.
/// When more can, exactly the first `threshold` in child order are used.
///
/// # Errors
/// - [`RecoveryError::MismatchedShareLineage`] if the selected contributions
///   were not produced by the same split
/// - [`RecoveryError::MalformedShareEncoding`] if a token runs out of indices
/// - any error of the threshold primitive
pub fn decode<S: ThresholdScheme + ?Sized>(
    scheme: &S,
    shares: &ShareMap,
    gate: &Gate,
) -> Result<Option<RecoveryContribution>> {
    let threshold = gate.threshold as usize;

    // Sub-gate results are owned here; leaf tokens are borrowed from `shares`
    let mut sub_results = Vec::new();
    let mut sources = Vec::with_capacity(gate.children.len());

    for child in &gate.children {
        if sources.len() == threshold {
            break;
        }
        match child {
            HierarchyNode::Leaf(name) => {
                if let Some(token) = shares.get(name) {
                    sources.push(Source::Leaf(token));
                }
            }
            HierarchyNode::Gate(sub_gate) => {
                if let Some(contribution) = decode(scheme, shares, sub_gate)? {
                    sources.push(Source::Gate(sub_results.len()));
                    sub_results.push(contribution);
                }
            }
        }
    }

    if sources.len() < threshold {
        trace!(threshold, satisfied = sources.len(), "gate unsatisfied");
        return Ok(None);
    }

    let candidates = sources
        .iter()
        .map(|source| match *source {
            Source::Leaf(token) => Candidate::new(token.value(), token.indices(), token.lineage()),
            Source::Gate(slot) => {
                let result = &sub_results[slot];
                Candidate::new(&result.value, &result.remaining_indices, result.lineage)
            }
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let Some(first) = candidates.first() else {
        return Ok(None);
    };

    if threshold == 1 {
        return Ok(Some(RecoveryContribution::new(
            first.value.clone(),
            first.remaining.to_vec(),
            first.lineage,
        )));
    }

    if !candidates.iter().all(|candidate| candidate.same_lineage(first)) {
        return Err(RecoveryError::MismatchedShareLineage.into());
    }

    let pairs: Vec<(ShareIndex, &FieldElement)> = candidates
        .iter()
        .map(|candidate| (candidate.index, candidate.value))
        .collect();
    let value = scheme.recover(gate.threshold, &pairs)?;
    trace!(threshold, "recovered gate value");

    Ok(Some(RecoveryContribution::new(
        value,
        first.remaining.to_vec(),
        first.lineage,
    )))
}
