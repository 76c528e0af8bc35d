use std::collections::BTreeSet;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::batch::{decode_batch, encode_batch};
use crate::domain::{BatchShareMap, FieldElement, ParticipantId};
use crate::hierarchy::{Hierarchy, HierarchyNode};
use crate::primitive::Shamir;
use crate::record::ShareRecord;
use crate::recoverable::is_recoverable;

/// Split text secrets through a hierarchy into one record per participant
///
/// Secrets are used byte for byte, surrounding whitespace included. Returns the
/// records sorted by participant name.
///
/// # Errors
/// Returns an error if the hierarchy is invalid, a secret is empty or too
/// large, or sharing fails
pub fn split_secrets<S: AsRef<str>>(
    secrets: &[S],
    hierarchy: &HierarchyNode,
) -> Result<Vec<ShareRecord>> {
    if secrets.is_empty() {
        bail!("No secrets provided");
    }

    let validated = Hierarchy::new(hierarchy.clone()).context("Invalid hierarchy")?;

    let elements = secrets
        .iter()
        .enumerate()
        .map(|(idx, secret)| {
            FieldElement::from_secret(secret.as_ref().as_bytes())
                .with_context(|| format!("Invalid secret #{}", idx + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch = encode_batch(&Shamir, &elements, &validated).context("Failed to split secrets")?;

    let records = batch
        .into_iter()
        .map(|(participant, tokens)| {
            ShareRecord::new(participant, &tokens, hierarchy.clone())
                .context("Failed to encode share")
        })
        .collect::<Result<Vec<_>>>()?;

    info!(secrets = secrets.len(), participants = records.len(), "split secrets");
    Ok(records)
}

/// Combine participant records to reconstruct the original secrets
///
/// Returns the secrets in the order they were split.
///
/// # Errors
/// Returns an error if no records are given, records disagree on the
/// hierarchy, a participant appears twice, a share fails to decode, or the
/// records cannot satisfy the hierarchy
pub fn combine_records(records: &[ShareRecord]) -> Result<Vec<String>> {
    let Some(first) = records.first() else {
        bail!("No share records provided");
    };

    let mut shares = BatchShareMap::new();

    for (idx, record) in records.iter().enumerate() {
        // Every record carries the hierarchy; they must all agree
        if record.hierarchy != first.hierarchy {
            bail!(
                "Record #{} ('{}') has inconsistent hierarchy",
                idx + 1,
                record.participant
            );
        }

        let tokens = record
            .tokens()
            .with_context(|| format!("Failed to parse record #{}", idx + 1))?;

        if shares.insert(record.participant.clone(), tokens).is_some() {
            bail!("Participant '{}' provided more than once", record.participant);
        }
    }

    let hierarchy = Hierarchy::new(first.hierarchy.clone()).context("Invalid hierarchy")?;

    let recovered = decode_batch(&Shamir, &shares, &hierarchy).context("Failed to recover secrets")?;

    let secrets = recovered
        .iter()
        .enumerate()
        .map(|(idx, secret)| {
            String::from_utf8(secret.as_bytes().to_vec())
                .with_context(|| format!("Recovered secret #{} is not valid UTF-8", idx + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(secrets = secrets.len(), participants = records.len(), "recovered secrets");
    Ok(secrets)
}

/// Check whether the named participants could recover secrets split through
/// `hierarchy`, without needing their shares
///
/// # Errors
/// Returns an error if the hierarchy is invalid or a name is not part of it
pub fn check_participants(hierarchy: &HierarchyNode, participants: &[String]) -> Result<bool> {
    let hierarchy = Hierarchy::new(hierarchy.clone()).context("Invalid hierarchy")?;

    let available = participants
        .iter()
        .map(|name| {
            let id = ParticipantId::from(name.as_str());
            if hierarchy.contains(&id) {
                Ok(id)
            } else {
                bail!("Participant '{name}' is not part of the hierarchy")
            }
        })
        .collect::<Result<BTreeSet<_>>>()?;

    Ok(is_recoverable(&available, hierarchy.root()))
}
