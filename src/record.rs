//! Per-participant share records
//!
//! A record is everything one participant needs to keep: their name, one
//! encoded token per secret in batch order, and the hierarchy the secrets were
//! split through. Records are stored as JSON.

use serde::{Deserialize, Serialize};

use crate::codec::{encode_token, parse_token};
use crate::domain::{ParticipantId, ShareToken};
use crate::error::RecoveryError;
use crate::hierarchy::HierarchyNode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub participant: ParticipantId,
    /// Token mnemonics, one per secret, in batch order
    pub shares: Vec<String>,
    pub hierarchy: HierarchyNode,
}

impl ShareRecord {
    /// Builds a record by encoding `tokens`
    ///
    /// # Errors
    /// Returns an error if a token cannot be encoded
    pub fn new(
        participant: ParticipantId,
        tokens: &[ShareToken],
        hierarchy: HierarchyNode,
    ) -> Result<Self, RecoveryError> {
        let shares = tokens
            .iter()
            .map(|token| encode_token(token).map(|mnemonic| mnemonic.to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            participant,
            shares,
            hierarchy,
        })
    }

    /// Decodes the record's tokens, in batch order
    ///
    /// # Errors
    /// Returns [`RecoveryError::MalformedShareEncoding`] naming the first token
    /// that fails to parse
    pub fn tokens(&self) -> Result<Vec<ShareToken>, RecoveryError> {
        self.shares
            .iter()
            .enumerate()
            .map(|(position, share)| {
                parse_token(share).map_err(|err| match err {
                    RecoveryError::MalformedShareEncoding(msg) => {
                        RecoveryError::MalformedShareEncoding(format!(
                            "share #{} of '{}': {msg}",
                            position + 1,
                            self.participant
                        ))
                    }
                    other => other,
                })
            })
            .collect()
    }

    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// # Errors
    /// Returns [`RecoveryError::MalformedShareEncoding`] if `json` is not a record
    pub fn from_json(json: &str) -> Result<Self, RecoveryError> {
        serde_json::from_str(json)
            .map_err(|e| RecoveryError::MalformedShareEncoding(format!("invalid share record: {e}")))
    }
}
