//! Recursive encoding of one secret through a quorum tree

use tracing::{debug, trace};

use crate::domain::{FieldElement, LineageId, ShareIndex, ShareMap, ShareToken};
use crate::error::PrimitiveError;
use crate::hierarchy::{Gate, Hierarchy, HierarchyNode};
use crate::primitive::ThresholdScheme;

/// Splits `secret` through a validated hierarchy
///
/// Returns one token per participant. Every token carries the same freshly
/// drawn lineage tag.
///
/// # Errors
/// Returns an error if the threshold primitive fails at any gate
pub fn split_secret<S: ThresholdScheme + ?Sized>(
    scheme: &S,
    secret: &FieldElement,
    hierarchy: &Hierarchy,
) -> Result<ShareMap, PrimitiveError> {
    let shares = encode(scheme, secret, hierarchy.root())?;
    debug!(participants = shares.len(), "split secret through hierarchy");
    Ok(shares)
}

/// Encodes `secret` through `gate` and everything below it
///
/// For each child position `i` the gate's share `(index_i, value_i)` either
/// becomes the leaf's token `(value_i, [index_i])` or is split again through
/// the child gate, with `index_i` appended to every token produced there.
/// Index lists therefore run from the nearest ancestor gate outwards.
///
/// # Errors
/// Returns an error if the threshold primitive fails at any gate
pub fn encode<S: ThresholdScheme + ?Sized>(
    scheme: &S,
    secret: &FieldElement,
    gate: &Gate,
) -> Result<ShareMap, PrimitiveError> {
    let lineage = LineageId::random();
    let mut shares = ShareMap::new();
    encode_gate(scheme, secret, gate, lineage, &mut shares)?;
    Ok(shares)
}

fn encode_gate<S: ThresholdScheme + ?Sized>(
    scheme: &S,
    secret: &FieldElement,
    gate: &Gate,
    lineage: LineageId,
    out: &mut ShareMap,
) -> Result<(), PrimitiveError> {
    let gate_shares = split_gate(scheme, secret, gate)?;
    trace!(
        threshold = gate.threshold,
        size = gate.children.len(),
        "split gate"
    );

    for ((index, value), child) in gate_shares.into_iter().zip(&gate.children) {
        match child {
            HierarchyNode::Leaf(name) => {
                out.insert(name.clone(), ShareToken::new(value, vec![index], lineage));
            }
            HierarchyNode::Gate(sub_gate) => {
                let mut sub_shares = ShareMap::new();
                encode_gate(scheme, &value, sub_gate, lineage, &mut sub_shares)?;
                for (name, mut token) in sub_shares {
                    token.push_outer_index(index);
                    out.insert(name, token);
                }
            }
        }
    }

    Ok(())
}

/// One `(index, value)` pair per child of `gate`
///
/// A 1-of-m gate gains nothing from splitting, so the primitive is bypassed
/// and every position receives the value itself.
fn split_gate<S: ThresholdScheme + ?Sized>(
    scheme: &S,
    secret: &FieldElement,
    gate: &Gate,
) -> Result<Vec<(ShareIndex, FieldElement)>, PrimitiveError> {
    let size = u8::try_from(gate.children.len()).map_err(|_| {
        PrimitiveError::Split(format!("gate has {} children, maximum is 255", gate.children.len()))
    })?;

    if gate.threshold == 1 {
        return (0..gate.children.len())
            .map(|position| {
                ShareIndex::from_position(position)
                    .map(|index| (index, secret.clone()))
                    .ok_or_else(|| PrimitiveError::Split("share index out of range".into()))
            })
            .collect();
    }

    scheme.split(secret, gate.threshold, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParticipantId;
    use crate::primitive::Shamir;

    fn indices(token: &ShareToken) -> Vec<u8> {
        token.indices().iter().map(|index| **index).collect()
    }

    fn scenario_b() -> Hierarchy {
        Hierarchy::new(HierarchyNode::gate(
            2,
            vec![
                HierarchyNode::leaf("X"),
                HierarchyNode::gate(
                    1,
                    vec![
                        HierarchyNode::leaf("P"),
                        HierarchyNode::leaf("Q"),
                        HierarchyNode::leaf("R"),
                    ],
                ),
            ],
        ))
        .unwrap()
    }

    #[test]
    fn test_every_participant_gets_a_token() {
        let hierarchy = scenario_b();
        let secret = FieldElement::from_secret(b"hello").unwrap();
        let shares = split_secret(&Shamir, &secret, &hierarchy).unwrap();

        let names: Vec<_> = shares.keys().map(ParticipantId::as_str).collect();
        assert_eq!(names, vec!["P", "Q", "R", "X"]);
    }

    #[test]
    fn test_indices_run_from_nearest_gate_outwards() {
        let hierarchy = scenario_b();
        let secret = FieldElement::from_secret(b"hello").unwrap();
        let shares = split_secret(&Shamir, &secret, &hierarchy).unwrap();

        assert_eq!(indices(&shares["X"]), vec![1]);
        assert_eq!(indices(&shares["P"]), vec![1, 2]);
        assert_eq!(indices(&shares["Q"]), vec![2, 2]);
        assert_eq!(indices(&shares["R"]), vec![3, 2]);
    }

    #[test]
    fn test_threshold_one_gate_forwards_value() {
        let hierarchy = scenario_b();
        let secret = FieldElement::from_secret(b"hello").unwrap();
        let shares = split_secret(&Shamir, &secret, &hierarchy).unwrap();

        assert_eq!(shares["P"].value(), shares["Q"].value());
        assert_eq!(shares["Q"].value(), shares["R"].value());
    }

    #[test]
    fn test_tokens_share_one_lineage() {
        let hierarchy = scenario_b();
        let secret = FieldElement::from_secret(b"hello").unwrap();
        let first = split_secret(&Shamir, &secret, &hierarchy).unwrap();
        let second = split_secret(&Shamir, &secret, &hierarchy).unwrap();

        assert!(first.values().all(|token| token.lineage() == first["X"].lineage()));
        assert_ne!(first["X"].lineage(), second["X"].lineage());
    }
}
