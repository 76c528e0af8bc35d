//! `FieldElement`: secret material handled by the threshold primitive

use zeroize::Zeroizing;

use crate::error::PrimitiveError;

/// A non-empty byte string, each byte an element of GF(256)
///
/// Wrapped in `Zeroizing` so secret material and intermediate shares are wiped
/// from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldElement(Zeroizing<Vec<u8>>);

impl FieldElement {
    /// Largest secret accepted; share values carry a 16-bit length when encoded
    pub const MAX_LEN: usize = u16::MAX as usize;

    /// Encodes caller secret bytes into a field element
    ///
    /// GF(256) arithmetic works byte-wise and cannot wrap around, so the only
    /// bound enforced is on length.
    ///
    /// # Errors
    /// Returns an error if the secret is empty or longer than [`Self::MAX_LEN`]
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hiershamir::domain::FieldElement;
    ///
    /// let element = FieldElement::from_secret(b"hello").unwrap();
    /// assert_eq!(element.as_bytes(), b"hello");
    ///
    /// assert!(FieldElement::from_secret(b"").is_err());
    /// ```
    pub fn from_secret(secret: &[u8]) -> Result<Self, PrimitiveError> {
        if secret.is_empty() {
            return Err(PrimitiveError::EmptySecret);
        }
        if secret.len() > Self::MAX_LEN {
            return Err(PrimitiveError::SecretTooLarge {
                len: secret.len(),
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(Zeroizing::new(secret.to_vec())))
    }

    /// Wraps bytes produced by the primitive or the token codec
    pub(crate) fn from_raw(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldElement(<{} bytes>)", self.0.len())
    }
}
