//! Quorum trees and their validation
//!
//! A hierarchy is a tree of n-of-m gates whose leaves are named participants.
//! The secret is recoverable when enough children of the root gate are
//! satisfied, where a leaf is satisfied by its participant contributing a share
//! and a nested gate is satisfied recursively.
//!
//! # JSON form
//!
//! Leaves are strings. Gates are either objects or positional
//! `[threshold, size, [children...]]` arrays:
//!
//! ```rust
//! use hiershamir::hierarchy::{Hierarchy, HierarchyNode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root: HierarchyNode = serde_json::from_str(
//!     r#"[2, 3, ["CEO", "CEO2", [1, 3, ["Liz", "Alex", "Ana"]]]]"#,
//! )?;
//! let hierarchy = Hierarchy::new(root)?;
//! assert_eq!(hierarchy.participants().len(), 5);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ParticipantId;
use crate::error::HierarchyError;

/// A node of the quorum tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HierarchyNode {
    /// A named share-holder
    Leaf(ParticipantId),
    /// An n-of-m quorum over child nodes
    Gate(Gate),
}

/// Internal quorum node: `threshold` of `size` children must be satisfied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    pub threshold: u8,
    pub size: u8,
    pub children: Vec<HierarchyNode>,
}

impl Gate {
    /// Builds a gate whose declared size matches its children
    ///
    /// Gates wider than 255 children are truncated in `size`, which validation
    /// then reports as a child count mismatch.
    #[must_use]
    pub fn new(threshold: u8, children: Vec<HierarchyNode>) -> Self {
        let size = u8::try_from(children.len()).unwrap_or(u8::MAX);
        Self {
            threshold,
            size,
            children,
        }
    }
}

impl HierarchyNode {
    #[must_use]
    pub fn leaf(name: impl Into<ParticipantId>) -> Self {
        Self::Leaf(name.into())
    }

    #[must_use]
    pub fn gate(threshold: u8, children: Vec<HierarchyNode>) -> Self {
        Self::Gate(Gate::new(threshold, children))
    }
}

/// Validates a quorum tree, returning every participant it names
///
/// A single participant set is threaded through the whole traversal, so a name
/// repeated anywhere in the tree is reported no matter how deep it is nested.
///
/// # Errors
/// - [`HierarchyError::DegenerateRootThreshold`] if the root is a leaf or a gate
///   with threshold <= 1
/// - [`HierarchyError::ZeroThreshold`] for a nested gate with threshold 0
/// - [`HierarchyError::ThresholdExceedsSize`] if a gate needs more than it has
/// - [`HierarchyError::ChildCountMismatch`] if a gate's children disagree with its size
/// - [`HierarchyError::DuplicateParticipant`] on the first repeated name
pub fn validate(root: &HierarchyNode) -> Result<BTreeSet<ParticipantId>, HierarchyError> {
    let HierarchyNode::Gate(gate) = root else {
        return Err(HierarchyError::DegenerateRootThreshold);
    };
    if gate.threshold <= 1 {
        return Err(HierarchyError::DegenerateRootThreshold);
    }

    let mut participants = BTreeSet::new();
    validate_gate(gate, &mut participants)?;

    debug!(participants = participants.len(), "validated hierarchy");
    Ok(participants)
}

fn validate_gate(gate: &Gate, seen: &mut BTreeSet<ParticipantId>) -> Result<(), HierarchyError> {
    if gate.threshold == 0 {
        return Err(HierarchyError::ZeroThreshold);
    }
    if gate.threshold > gate.size {
        return Err(HierarchyError::ThresholdExceedsSize {
            threshold: gate.threshold,
            size: gate.size,
        });
    }
    if gate.children.len() != gate.size as usize {
        return Err(HierarchyError::ChildCountMismatch {
            declared: gate.size,
            actual: gate.children.len(),
        });
    }

    for child in &gate.children {
        match child {
            HierarchyNode::Leaf(name) => {
                if !seen.insert(name.clone()) {
                    return Err(HierarchyError::DuplicateParticipant(name.clone()));
                }
            }
            HierarchyNode::Gate(sub_gate) => validate_gate(sub_gate, seen)?,
        }
    }

    Ok(())
}

/// A quorum tree that has passed [`validate`]
///
/// Every encode and decode entry point takes a `Hierarchy`, so no
/// cryptographic work can run against an unchecked tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    root: Gate,
    participants: BTreeSet<ParticipantId>,
}

impl Hierarchy {
    /// Validates `root` and wraps it
    ///
    /// # Errors
    /// Returns the first structural problem found by [`validate`]
    pub fn new(root: HierarchyNode) -> Result<Self, HierarchyError> {
        let participants = validate(&root)?;
        let HierarchyNode::Gate(root) = root else {
            return Err(HierarchyError::DegenerateRootThreshold);
        };
        Ok(Self { root, participants })
    }

    #[must_use]
    pub fn root(&self) -> &Gate {
        &self.root
    }

    #[must_use]
    pub fn participants(&self) -> &BTreeSet<ParticipantId> {
        &self.participants
    }

    #[must_use]
    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.participants.contains(participant)
    }

    /// The tree as a plain node, for persisting alongside shares
    #[must_use]
    pub fn to_node(&self) -> HierarchyNode {
        HierarchyNode::Gate(self.root.clone())
    }
}

impl TryFrom<HierarchyNode> for Hierarchy {
    type Error = HierarchyError;

    fn try_from(root: HierarchyNode) -> Result<Self, Self::Error> {
        Self::new(root)
    }
}
