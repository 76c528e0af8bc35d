//! Property tests for hierarchical split/reconstruct workflows

use std::collections::{BTreeMap, BTreeSet};

use hiershamir::batch::{decode_batch, encode_batch};
use hiershamir::domain::{BatchShareMap, FieldElement, ParticipantId, ShareMap};
use hiershamir::hierarchy::{Hierarchy, HierarchyNode};
use hiershamir::primitive::Shamir;
use hiershamir::reconstruct::reconstruct;
use hiershamir::recoverable::is_recoverable;
use hiershamir::split::split_secret;
use hiershamir::{Error, RecoveryError};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

/// Wrapper for secrets of 1 to 64 bytes
#[derive(Clone, Debug)]
struct Secret(FieldElement);

impl Arbitrary for Secret {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = (usize::arbitrary(g) % 64) + 1;
        let bytes: Vec<u8> = (0..len).map(|_| u8::arbitrary(g)).collect();
        Secret(FieldElement::from_secret(&bytes).unwrap())
    }
}

/// Wrapper for valid hierarchies up to three gates deep
///
/// The root has 2 to 4 children and a threshold of at least 2. Nested gates
/// have 1 to 3 children and any threshold from 1 up, so pass-through gates
/// show up regularly.
#[derive(Clone, Debug)]
struct RandomHierarchy(Hierarchy);

impl Arbitrary for RandomHierarchy {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut next_id = 0;
        let size = (u8::arbitrary(g) % 3) + 2; // 2..=4
        let threshold = (u8::arbitrary(g) % (size - 1)) + 2; // 2..=size

        let children = (0..size)
            .map(|_| arbitrary_node(g, 2, &mut next_id))
            .collect();

        let root = HierarchyNode::gate(threshold, children);
        RandomHierarchy(Hierarchy::new(root).expect("Generated hierarchy is valid"))
    }
}

fn arbitrary_node(g: &mut Gen, depth_left: u8, next_id: &mut usize) -> HierarchyNode {
    if depth_left == 0 || u8::arbitrary(g) % 3 != 0 {
        let name = format!("p{next_id}");
        *next_id += 1;
        return HierarchyNode::leaf(name);
    }

    let size = (u8::arbitrary(g) % 3) + 1; // 1..=3
    let threshold = (u8::arbitrary(g) % size) + 1; // 1..=size
    let children = (0..size)
        .map(|_| arbitrary_node(g, depth_left - 1, next_id))
        .collect();

    HierarchyNode::gate(threshold, children)
}

/// Keeps the participants whose bit is set in `selection`
fn select<T: Clone>(shares: &BTreeMap<ParticipantId, T>, selection: u64) -> BTreeMap<ParticipantId, T> {
    shares
        .iter()
        .enumerate()
        .filter(|(position, _)| (selection >> (position % 64)) & 1 == 1)
        .map(|(_, (participant, share))| (participant.clone(), share.clone()))
        .collect()
}

/// Test that all participants together always recover the secret
#[quickcheck]
fn prop_all_participants_recover(secret: Secret, hierarchy: RandomHierarchy) -> bool {
    let Secret(secret) = secret;
    let RandomHierarchy(hierarchy) = hierarchy;

    let Ok(shares) = split_secret(&Shamir, &secret, &hierarchy) else {
        return false;
    };

    if shares.len() != hierarchy.participants().len() {
        return false;
    }

    reconstruct(&Shamir, &shares, &hierarchy) == Ok(secret)
}

/// Test that reconstruction succeeds exactly when the subset is recoverable
#[quickcheck]
fn prop_reconstruct_agrees_with_recoverability(
    secret: Secret,
    hierarchy: RandomHierarchy,
    selection: u64,
) -> bool {
    let Secret(secret) = secret;
    let RandomHierarchy(hierarchy) = hierarchy;

    let Ok(shares) = split_secret(&Shamir, &secret, &hierarchy) else {
        return false;
    };

    let selected: ShareMap = select(&shares, selection);
    let available: BTreeSet<ParticipantId> = selected.keys().cloned().collect();
    let recoverable = is_recoverable(&available, hierarchy.root());

    match reconstruct(&Shamir, &selected, &hierarchy) {
        Ok(recovered) => recoverable && recovered == secret,
        Err(Error::Recovery(RecoveryError::InsufficientShares)) => !recoverable,
        Err(_) => false,
    }
}

/// Test that adding participants never makes a recoverable set unrecoverable
#[quickcheck]
fn prop_recoverability_is_monotone(hierarchy: RandomHierarchy, selection: u64, extra: u64) -> bool {
    let RandomHierarchy(hierarchy) = hierarchy;
    let participants: Vec<_> = hierarchy.participants().iter().cloned().collect();

    let pick = |mask: u64| -> BTreeSet<ParticipantId> {
        participants
            .iter()
            .enumerate()
            .filter(|(position, _)| (mask >> (position % 64)) & 1 == 1)
            .map(|(_, participant)| participant.clone())
            .collect()
    };

    let smaller = pick(selection);
    let larger = pick(selection | extra);

    !is_recoverable(&smaller, hierarchy.root()) || is_recoverable(&larger, hierarchy.root())
}

/// Test that batches come back in their original order
#[quickcheck]
fn prop_batch_round_trip(secrets: Vec<Secret>, hierarchy: RandomHierarchy) -> bool {
    let RandomHierarchy(hierarchy) = hierarchy;
    let secrets: Vec<FieldElement> = secrets.into_iter().take(8).map(|Secret(s)| s).collect();

    if secrets.is_empty() {
        return true;
    }

    let Ok(batch) = encode_batch(&Shamir, &secrets, &hierarchy) else {
        return false;
    };

    if batch.values().any(|tokens| tokens.len() != secrets.len()) {
        return false;
    }

    decode_batch(&Shamir, &batch, &hierarchy) == Ok(secrets)
}

/// Test that a batch decodes from any recoverable subset of participants
#[quickcheck]
fn prop_batch_subset_recovers(secrets: Vec<Secret>, hierarchy: RandomHierarchy, selection: u64) -> bool {
    let RandomHierarchy(hierarchy) = hierarchy;
    let secrets: Vec<FieldElement> = secrets.into_iter().take(4).map(|Secret(s)| s).collect();

    if secrets.is_empty() {
        return true;
    }

    let Ok(batch) = encode_batch(&Shamir, &secrets, &hierarchy) else {
        return false;
    };

    let selected: BatchShareMap = select(&batch, selection);
    let available: BTreeSet<ParticipantId> = selected.keys().cloned().collect();

    if !is_recoverable(&available, hierarchy.root()) {
        return true;
    }

    decode_batch(&Shamir, &selected, &hierarchy) == Ok(secrets)
}

/// Test that swapping in a share from another split never yields a wrong secret
///
/// Either the swapped share is not needed and the original comes back, or it
/// meets its siblings at a gate and the lineage mismatch is reported.
#[quickcheck]
fn prop_mixed_splits_never_yield_wrong_secret(
    first: Secret,
    second: Secret,
    hierarchy: RandomHierarchy,
    victim: usize,
) -> bool {
    let Secret(first) = first;
    let Secret(second) = second;
    let RandomHierarchy(hierarchy) = hierarchy;

    let (Ok(mut shares), Ok(other)) = (
        split_secret(&Shamir, &first, &hierarchy),
        split_secret(&Shamir, &second, &hierarchy),
    ) else {
        return false;
    };

    let Some(participant) = shares.keys().nth(victim % shares.len()).cloned() else {
        return false;
    };
    shares.insert(participant.clone(), other[&participant].clone());

    match reconstruct(&Shamir, &shares, &hierarchy) {
        Ok(recovered) => recovered == first,
        Err(Error::Recovery(RecoveryError::MismatchedShareLineage)) => true,
        Err(_) => false,
    }
}
