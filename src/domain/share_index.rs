//! `ShareIndex` newtype for positional share indices

use serde::{Deserialize, Serialize};

/// 1-based position of a child among its parent gate's children (1..=255)
///
/// Index 0 is the x-coordinate of the secret itself in GF(256), so it never
/// names a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ShareIndex(u8);

impl ShareIndex {
    /// Maximum valid share index (255)
    pub const MAX: u8 = u8::MAX;

    /// Creates a new share index, `None` for 0
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hiershamir::domain::ShareIndex;
    ///
    /// let index = ShareIndex::new(1).unwrap();
    /// assert_eq!(*index, 1);
    ///
    /// let max_index = ShareIndex::new(ShareIndex::MAX).unwrap();
    /// assert_eq!(*max_index, 255);
    ///
    /// // Invalid: 0 is the secret's own coordinate
    /// assert!(ShareIndex::new(0).is_none());
    /// ```
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (value != 0).then_some(Self(value))
    }

    /// Index of the child at 0-based `position` within its gate
    #[must_use]
    pub fn from_position(position: usize) -> Option<Self> {
        u8::try_from(position + 1).ok().and_then(Self::new)
    }
}

impl TryFrom<u8> for ShareIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "share index must be non-zero".to_string())
    }
}

impl From<ShareIndex> for u8 {
    fn from(index: ShareIndex) -> Self {
        index.0
    }
}

impl std::ops::Deref for ShareIndex {
    type Target = u8;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ShareIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
