//! Structural quorum evaluation, no cryptography involved

use std::collections::BTreeSet;

use crate::domain::ParticipantId;
use crate::hierarchy::{Gate, HierarchyNode};

/// Whether `available` participants satisfy `gate`
///
/// A leaf counts when its participant is available, a nested gate when it is
/// itself satisfied. A gate is satisfied when at least `threshold` of its
/// children count.
#[must_use]
pub fn is_recoverable(available: &BTreeSet<ParticipantId>, gate: &Gate) -> bool {
    satisfied_children(available, gate) >= gate.threshold as usize
}

fn satisfied_children(available: &BTreeSet<ParticipantId>, gate: &Gate) -> usize {
    gate.children
        .iter()
        .filter(|child| match child {
            HierarchyNode::Leaf(name) => available.contains(name),
            HierarchyNode::Gate(sub_gate) => is_recoverable(available, sub_gate),
        })
        .count()
}
