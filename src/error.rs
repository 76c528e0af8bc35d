//! Typed errors for hierarchy validation, reconstruction and the threshold primitive

use thiserror::Error;

use crate::domain::ParticipantId;

/// Structural problems in a quorum tree, detected before any cryptographic work
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("gate threshold {threshold} exceeds gate size {size}")]
    ThresholdExceedsSize { threshold: u8, size: u8 },

    #[error("gate declares {declared} children but has {actual}")]
    ChildCountMismatch { declared: u8, actual: usize },

    #[error("participant '{0}' appears more than once in the hierarchy")]
    DuplicateParticipant(ParticipantId),

    /// The root must be a gate requiring at least two children
    #[error("root of the hierarchy must be a gate with threshold greater than 1")]
    DegenerateRootThreshold,

    #[error("gate threshold must be at least 1")]
    ZeroThreshold,
}

/// Operational failures while reconstructing secrets from contributed shares
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    /// Not enough participants to satisfy the quorum tree; solicit more shares
    #[error("insufficient shares to satisfy the hierarchy")]
    InsufficientShares,

    #[error("participant '{0}' is not part of the hierarchy")]
    UnknownParticipant(ParticipantId),

    #[error("shares combined at one gate descend from different splits")]
    MismatchedShareLineage,

    #[error("participant '{participant}' holds {actual} shares, expected {expected}")]
    IncompleteBatch {
        participant: ParticipantId,
        expected: usize,
        actual: usize,
    },

    #[error("malformed share encoding: {0}")]
    MalformedShareEncoding(String),
}

/// Failures reported by the flat threshold primitive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitiveError {
    #[error("secret must not be empty")]
    EmptySecret,

    #[error("secret is {len} bytes, maximum is {max}")]
    SecretTooLarge { len: usize, max: usize },

    #[error("failed to split secret: {0}")]
    Split(String),

    #[error("failed to recover secret: {0}")]
    Recover(String),
}

/// Any failure surfaced by the hierarchical sharing engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    #[error(transparent)]
    Primitive(#[from] PrimitiveError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
