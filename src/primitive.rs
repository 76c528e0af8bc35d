//! Flat (n, m) threshold secret sharing
//!
//! The hierarchy engine composes any [`ThresholdScheme`]; [`Shamir`] is the
//! implementation shipped with the crate, backed by `blahaj` (Shamir over
//! GF(256), each secret byte shared independently).

use blahaj::{Share, Sharks};

use crate::domain::{FieldElement, ShareIndex};
use crate::error::PrimitiveError;

/// A flat threshold secret sharing scheme
pub trait ThresholdScheme: Sync {
    /// Splits `secret` into exactly `size` shares indexed `1..=size`, any
    /// `threshold` of which determine it
    ///
    /// # Errors
    /// Returns an error if the scheme cannot produce the shares
    fn split(
        &self,
        secret: &FieldElement,
        threshold: u8,
        size: u8,
    ) -> Result<Vec<(ShareIndex, FieldElement)>, PrimitiveError>;

    /// Recovers a secret from exactly `threshold` indexed shares
    ///
    /// # Errors
    /// Returns an error on malformed or inconsistent input
    fn recover(
        &self,
        threshold: u8,
        shares: &[(ShareIndex, &FieldElement)],
    ) -> Result<FieldElement, PrimitiveError>;
}

/// Shamir Secret Sharing over GF(256) via `blahaj`
#[derive(Debug, Clone, Copy, Default)]
pub struct Shamir;

impl ThresholdScheme for Shamir {
    fn split(
        &self,
        secret: &FieldElement,
        threshold: u8,
        size: u8,
    ) -> Result<Vec<(ShareIndex, FieldElement)>, PrimitiveError> {
        if secret.is_empty() {
            return Err(PrimitiveError::EmptySecret);
        }
        if threshold == 0 || threshold > size {
            return Err(PrimitiveError::Split(format!(
                "invalid threshold {threshold} for {size} shares"
            )));
        }

        let sharks = Sharks(threshold);
        let mut shares = Vec::with_capacity(size as usize);

        for share in sharks.dealer(secret.as_bytes()).take(size as usize) {
            // Serialized as [x, y...]; x is the share's evaluation point
            let bytes = Vec::from(&share);
            let (&x, y) = bytes
                .split_first()
                .ok_or_else(|| PrimitiveError::Split("dealer produced an empty share".into()))?;
            let index = ShareIndex::new(x)
                .ok_or_else(|| PrimitiveError::Split("dealer produced share index 0".into()))?;
            shares.push((index, FieldElement::from_raw(y.to_vec())));
        }

        if shares.len() != size as usize {
            return Err(PrimitiveError::Split(format!(
                "dealer produced {} of {size} shares",
                shares.len()
            )));
        }

        Ok(shares)
    }

    fn recover(
        &self,
        threshold: u8,
        shares: &[(ShareIndex, &FieldElement)],
    ) -> Result<FieldElement, PrimitiveError> {
        if shares.len() != threshold as usize {
            return Err(PrimitiveError::Recover(format!(
                "expected exactly {threshold} shares, got {}",
                shares.len()
            )));
        }

        let parsed = shares
            .iter()
            .map(|(index, value)| {
                let mut bytes = Vec::with_capacity(value.len() + 1);
                bytes.push(**index);
                bytes.extend_from_slice(value.as_bytes());
                let share = Share::try_from(bytes.as_slice())
                    .map_err(|e| PrimitiveError::Recover(format!("invalid share: {e}")));
                zeroize::Zeroize::zeroize(&mut bytes);
                share
            })
            .collect::<Result<Vec<_>, _>>()?;

        let recovered = Sharks(threshold)
            .recover(&parsed)
            .map_err(|e| PrimitiveError::Recover(format!("{e:?}")))?;

        Ok(FieldElement::from_raw(recovered))
    }
}

/// [`Shamir`] that counts how often the primitive is asked to recover
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct CountingScheme {
    recoveries: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl CountingScheme {
    pub(crate) fn recoveries(&self) -> usize {
        self.recoveries.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl ThresholdScheme for CountingScheme {
    fn split(
        &self,
        secret: &FieldElement,
        threshold: u8,
        size: u8,
    ) -> Result<Vec<(ShareIndex, FieldElement)>, PrimitiveError> {
        Shamir.split(secret, threshold, size)
    }

    fn recover(
        &self,
        threshold: u8,
        shares: &[(ShareIndex, &FieldElement)],
    ) -> Result<FieldElement, PrimitiveError> {
        self.recoveries.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Shamir.recover(threshold, shares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(bytes: &[u8]) -> FieldElement {
        FieldElement::from_secret(bytes).unwrap()
    }

    #[test]
    fn test_split_indices_are_positions() {
        let shares = Shamir.split(&secret(b"hello"), 2, 4).unwrap();
        let indices: Vec<u8> = shares.iter().map(|(index, _)| **index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert!(shares.iter().all(|(_, value)| value.len() == 5));
    }

    #[test]
    fn test_recover_from_any_threshold_subset() {
        let original = secret(b"threshold works");
        let shares = Shamir.split(&original, 3, 5).unwrap();

        let subset = [
            (shares[4].0, &shares[4].1),
            (shares[0].0, &shares[0].1),
            (shares[2].0, &shares[2].1),
        ];
        assert_eq!(Shamir.recover(3, &subset).unwrap(), original);
    }

    #[test]
    fn test_recover_rejects_wrong_arity() {
        let shares = Shamir.split(&secret(b"arity"), 3, 5).unwrap();
        let subset = [(shares[0].0, &shares[0].1), (shares[1].0, &shares[1].1)];
        assert!(matches!(
            Shamir.recover(3, &subset),
            Err(PrimitiveError::Recover(_))
        ));
    }

    #[test]
    fn test_split_rejects_threshold_above_size() {
        assert!(matches!(
            Shamir.split(&secret(b"x"), 4, 3),
            Err(PrimitiveError::Split(_))
        ));
    }

    #[test]
    fn test_split_max_gate_width() {
        let shares = Shamir.split(&secret(b"wide"), 2, u8::MAX).unwrap();
        assert_eq!(shares.len(), 255);
        assert_eq!(*shares[254].0, 255);
    }
}
