//! Domain types for hierarchical secret sharing
//!
//! - [`ParticipantId`] - Name of a share-holder, unique across a hierarchy
//! - [`ShareIndex`] - 1-based child position within a gate (1..=255)
//! - [`FieldElement`] - Zeroizing secret or share value over GF(256)
//! - [`ShareToken`] - Per-participant share with its index chain and lineage
//! - [`RecoveryContribution`] - Value flowing up from a decoded gate

mod field;
mod participant;
mod share_index;
mod token;

pub use field::FieldElement;
pub use participant::ParticipantId;
pub use share_index::ShareIndex;
pub use token::{LineageId, RecoveryContribution, ShareToken};

use std::collections::BTreeMap;

/// One token per participant, for a single secret
pub type ShareMap = BTreeMap<ParticipantId, ShareToken>;

/// One token per batch position, per participant
pub type BatchShareMap = BTreeMap<ParticipantId, Vec<ShareToken>>;
