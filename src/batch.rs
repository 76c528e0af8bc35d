//! Splitting and reconstructing ordered batches of independent secrets
//!
//! Each batch position is split (or reconstructed) on its own, with a lineage
//! tag of its own, so positions cannot be mixed at reconstruction time.
//! Positions are spread over scoped worker threads and reassembled by position.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::thread;

use tracing::debug;

use crate::domain::{BatchShareMap, FieldElement, ParticipantId, ShareMap};
use crate::error::{RecoveryError, Result};
use crate::hierarchy::Hierarchy;
use crate::primitive::ThresholdScheme;
use crate::reconstruct::reconstruct;
use crate::recoverable::is_recoverable;
use crate::split::split_secret;

/// Splits every secret through `hierarchy`
///
/// Each participant receives one token per secret, in the order the secrets
/// were given.
///
/// # Errors
/// Returns the error of the first failing position
pub fn encode_batch<S: ThresholdScheme + ?Sized>(
    scheme: &S,
    secrets: &[FieldElement],
    hierarchy: &Hierarchy,
) -> Result<BatchShareMap> {
    let per_position = run_positions(secrets.len(), |position| {
        split_secret(scheme, &secrets[position], hierarchy)
    });

    let mut batch: BatchShareMap = hierarchy
        .participants()
        .iter()
        .map(|name| (name.clone(), Vec::with_capacity(secrets.len())))
        .collect();

    for shares in per_position {
        for (name, token) in shares? {
            batch.entry(name).or_default().push(token);
        }
    }

    debug!(secrets = secrets.len(), participants = batch.len(), "split batch");
    Ok(batch)
}

/// Reconstructs every secret of a batch, in batch order
///
/// The batch length is taken from the first participant (in id order); every
/// other participant must hold the same number of tokens.
///
/// # Errors
/// - [`RecoveryError::InsufficientShares`] for an empty share set or one that
///   cannot satisfy the hierarchy
/// - [`RecoveryError::UnknownParticipant`] for a participant outside the hierarchy
/// - [`RecoveryError::IncompleteBatch`] if sequence lengths disagree
/// - otherwise the error of the first failing position
pub fn decode_batch<S: ThresholdScheme + ?Sized>(
    scheme: &S,
    shares: &BatchShareMap,
    hierarchy: &Hierarchy,
) -> Result<Vec<FieldElement>> {
    let expected = shares
        .values()
        .next()
        .map(Vec::len)
        .ok_or(RecoveryError::InsufficientShares)?;

    for (name, tokens) in shares {
        if !hierarchy.contains(name) {
            return Err(RecoveryError::UnknownParticipant(name.clone()).into());
        }
        if tokens.len() != expected {
            return Err(RecoveryError::IncompleteBatch {
                participant: name.clone(),
                expected,
                actual: tokens.len(),
            }
            .into());
        }
    }

    let available: BTreeSet<ParticipantId> = shares.keys().cloned().collect();
    if !is_recoverable(&available, hierarchy.root()) {
        return Err(RecoveryError::InsufficientShares.into());
    }

    let recovered = run_positions(expected, |position| {
        let position_shares: ShareMap = shares
            .iter()
            .map(|(name, tokens)| (name.clone(), tokens[position].clone()))
            .collect();
        reconstruct(scheme, &position_shares, hierarchy)
    });

    let secrets = recovered.into_iter().collect::<Result<Vec<_>>>()?;
    debug!(secrets = secrets.len(), "reconstructed batch");
    Ok(secrets)
}

/// Runs `work` for every position in `0..len`, returning results in position order
///
/// Positions are cut into one contiguous chunk per worker; each worker writes
/// into its own slice of a pre-sized slot vector.
fn run_positions<T, F>(len: usize, work: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    let workers = thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .min(len);

    if workers <= 1 {
        return (0..len).map(&work).collect();
    }

    let chunk_len = len.div_ceil(workers);
    let mut slots: Vec<Option<T>> = (0..len).map(|_| None).collect();

    thread::scope(|scope| {
        for (chunk_index, chunk) in slots.chunks_mut(chunk_len).enumerate() {
            let work = &work;
            scope.spawn(move || {
                let offset = chunk_index * chunk_len;
                for (i, slot) in chunk.iter_mut().enumerate() {
                    *slot = Some(work(offset + i));
                }
            });
        }
    });

    slots.into_iter().flatten().collect()
}
