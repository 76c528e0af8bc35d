//! Share tokens and the intermediate contributions built from them

use super::{FieldElement, ShareIndex};

/// Random tag shared by every token produced by one split of one secret
///
/// Positional indices are identical for every secret split through the same
/// tree, so the tag is what tells two splits apart at reconstruction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineageId([u8; 16]);

impl LineageId {
    pub const LEN: usize = 16;

    /// Draws a fresh tag from the thread-local CSPRNG
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// The unit handed to a participant for one secret
///
/// `indices[0]` is the leaf's position under its parent gate, `indices[1]` the
/// parent's position under the grandparent, and so on up to (excluding) the
/// root.
///
/// Tokens are immutable once built; the splitter alone extends the index chain
/// while a token is still on its way up from a nested gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareToken {
    value: FieldElement,
    indices: Vec<ShareIndex>,
    lineage: LineageId,
}

impl ShareToken {
    #[must_use]
    pub fn new(value: FieldElement, indices: Vec<ShareIndex>, lineage: LineageId) -> Self {
        Self {
            value,
            indices,
            lineage,
        }
    }

    #[must_use]
    pub fn value(&self) -> &FieldElement {
        &self.value
    }

    /// Child positions, nearest gate first
    #[must_use]
    pub fn indices(&self) -> &[ShareIndex] {
        &self.indices
    }

    #[must_use]
    pub fn lineage(&self) -> LineageId {
        self.lineage
    }

    /// Number of ancestor gates below the root, i.e. the leaf's depth
    #[must_use]
    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    /// Records the position of the enclosing gate's child that produced this token
    pub(crate) fn push_outer_index(&mut self, index: ShareIndex) {
        self.indices.push(index);
    }
}

/// Intermediate value produced while decoding a non-root gate
///
/// Structurally a token whose front index has already been consumed: it acts as
/// a synthetic leaf contribution to the parent gate. At the root,
/// `remaining_indices` must be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryContribution {
    pub value: FieldElement,
    pub remaining_indices: Vec<ShareIndex>,
    pub lineage: LineageId,
}

impl RecoveryContribution {
    #[must_use]
    pub fn new(value: FieldElement, remaining_indices: Vec<ShareIndex>, lineage: LineageId) -> Self {
        Self {
            value,
            remaining_indices,
            lineage,
        }
    }
}
