//! Hierarchical threshold secret sharing
//!
//! Secrets are split through a tree of n-of-m gates whose leaves are named
//! participants. A secret comes back only when the contributing participants
//! satisfy the root gate, counting nested gates as satisfied recursively.
//!
//! ```rust
//! use hiershamir::batch::{decode_batch, encode_batch};
//! use hiershamir::domain::FieldElement;
//! use hiershamir::hierarchy::{Hierarchy, HierarchyNode};
//! use hiershamir::primitive::Shamir;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 2 of: X, or any 1 of P/Q/R
//! let hierarchy = Hierarchy::new(HierarchyNode::gate(2, vec![
//!     HierarchyNode::leaf("X"),
//!     HierarchyNode::gate(1, vec![
//!         HierarchyNode::leaf("P"),
//!         HierarchyNode::leaf("Q"),
//!         HierarchyNode::leaf("R"),
//!     ]),
//! ]))?;
//!
//! let secrets = vec![FieldElement::from_secret(b"launch code")?];
//! let mut shares = encode_batch(&Shamir, &secrets, &hierarchy)?;
//! shares.retain(|name, _| name.as_str() == "X" || name.as_str() == "Q");
//!
//! let recovered = decode_batch(&Shamir, &shares, &hierarchy)?;
//! assert_eq!(recovered[0].as_bytes(), b"launch code");
//! # Ok(())
//! # }
//! ```

pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod commands;
pub mod domain;
pub mod error;
pub mod hierarchy;
pub mod primitive;
pub mod reconstruct;
pub mod record;
pub mod recoverable;
pub mod split;
pub mod wasm;

pub use error::{Error, HierarchyError, PrimitiveError, RecoveryError};
pub use hierarchy::{Hierarchy, HierarchyNode};
