//! Share token encoding as checksummed BIP39 word mnemonics
//!
//! A token is rendered as a single line of words so it can be written down,
//! read aloud, or stored in a text record:
//!
//! ```text
//! hiershamir <data words...>
//! ```
//!
//! The data words pack 11 bits each (BIP39 English word list), left-padded with
//! zero bits, over the payload:
//!
//! ```text
//! version (1) || lineage (16) || depth (1) || indices (depth)
//!     || value length (2, BE) || value || CRC32 (4, BE)
//! ```
//!
//! The CRC covers everything before it. The version byte is non-zero, so a
//! zero byte recovered in front of it can only be padding.
//!
//! # Examples
//!
//! ```rust
//! use hiershamir::codec::{encode_token, parse_token};
//! use hiershamir::domain::{FieldElement, LineageId, ShareIndex, ShareToken};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let token = ShareToken::new(
//!     FieldElement::from_secret(&[0xDE, 0xAD, 0xBE, 0xEF])?,
//!     vec![ShareIndex::new(2).unwrap(), ShareIndex::new(1).unwrap()],
//!     LineageId::random(),
//! );
//!
//! let mnemonic = encode_token(&token)?;
//! assert!(mnemonic.as_str().starts_with("hiershamir "));
//!
//! assert_eq!(parse_token(mnemonic.as_str())?, token);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result, anyhow, bail};
use bip39::Language;
use crc::{CRC_32_ISO_HDLC, Crc};
use std::collections::HashMap;
use std::sync::LazyLock;
use zeroize::Zeroizing;

use crate::domain::{FieldElement, LineageId, ShareIndex, ShareToken};
use crate::error::RecoveryError;

/// CRC32 algorithm for token integrity checking
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Version word that identifies the token format
pub const VERSION_WORD: &str = "hiershamir";

/// Payload format version, always the first payload byte
const FORMAT_VERSION: u8 = 1;

/// A share token rendered as words
///
/// Wraps the mnemonic in `Zeroizing` to ensure secure memory cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenMnemonic(Zeroizing<String>);

impl TokenMnemonic {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenMnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &*self.0)
    }
}

/// Static `HashMap` for O(1) word-to-index lookups
static WORD_TO_INDEX_MAP: LazyLock<HashMap<&'static str, usize>> = LazyLock::new(|| {
    Language::English
        .word_list()
        .iter()
        .enumerate()
        .map(|(idx, &word)| (word, idx))
        .collect()
});

/// Encodes a share token as a mnemonic
///
/// # Errors
/// Returns [`RecoveryError::MalformedShareEncoding`] if the token is too deep
/// (more than 255 indices) or its value is longer than 65535 bytes
pub fn encode_token(token: &ShareToken) -> Result<TokenMnemonic, RecoveryError> {
    create_mnemonic(token).map_err(malformed)
}

/// Parses a mnemonic back into a share token
///
/// # Errors
/// Returns [`RecoveryError::MalformedShareEncoding`] if the version word is
/// wrong, a word is not in the BIP39 list, the payload is truncated, or the
/// checksum does not match
pub fn parse_token(mnemonic: &str) -> Result<ShareToken, RecoveryError> {
    parse_mnemonic(mnemonic).map_err(malformed)
}

fn malformed(err: anyhow::Error) -> RecoveryError {
    RecoveryError::MalformedShareEncoding(format!("{err:#}"))
}

fn create_mnemonic(token: &ShareToken) -> Result<TokenMnemonic> {
    let depth = u8::try_from(token.indices().len())
        .map_err(|_| anyhow!("Token has {} indices (max 255)", token.indices().len()))?;
    let value_len = u16::try_from(token.value().len())
        .map_err(|_| anyhow!("Share value too large: {} bytes (max 65535)", token.value().len()))?;

    let capacity = 1 + LineageId::LEN + 1 + token.indices().len() + 2 + token.value().len() + 4;
    let mut payload = Zeroizing::new(Vec::with_capacity(capacity));
    payload.push(FORMAT_VERSION);
    payload.extend_from_slice(token.lineage().as_bytes());
    payload.push(depth);
    payload.extend(token.indices().iter().map(|index| **index));
    payload.extend_from_slice(&value_len.to_be_bytes());
    payload.extend_from_slice(token.value().as_bytes());

    let checksum = CRC32.checksum(&payload);
    payload.extend_from_slice(&checksum.to_be_bytes());

    let mut words = vec![VERSION_WORD.to_string()];
    words.extend(encode_data(&payload)?);

    Ok(TokenMnemonic(Zeroizing::new(words.join(" "))))
}

fn parse_mnemonic(mnemonic: &str) -> Result<ShareToken> {
    let words: Vec<String> = mnemonic.split_whitespace().map(str::to_lowercase).collect();

    let Some((version, data_words)) = words.split_first() else {
        bail!("Empty mnemonic");
    };

    if version != VERSION_WORD {
        bail!("Invalid version word: expected '{VERSION_WORD}', got '{version}'");
    }
    if data_words.is_empty() {
        bail!("No share data words found");
    }

    let max_bytes = data_words.len() * 11 / 8;
    let mut payload = decode_data(data_words, max_bytes)?;

    // Up to 10 bits of left padding may surface as one leading zero byte
    if payload.first() == Some(&0) {
        payload.remove(0);
    }

    let mut reader = PayloadReader::new(&payload);

    let version = reader.byte().context("Missing format version")?;
    if version != FORMAT_VERSION {
        bail!("Unsupported token format version {version}");
    }

    let lineage: [u8; LineageId::LEN] = reader
        .take(LineageId::LEN)
        .context("Missing lineage tag")?
        .try_into()
        .map_err(|_| anyhow!("Lineage tag has wrong length"))?;

    let depth = reader.byte().context("Missing token depth")?;
    let indices = reader
        .take(depth as usize)
        .context("Missing share indices")?
        .iter()
        .map(|&index| ShareIndex::new(index).ok_or_else(|| anyhow!("Share index 0 is invalid")))
        .collect::<Result<Vec<_>>>()?;

    let value_len = reader.take(2).context("Missing value length")?;
    let value_len = u16::from_be_bytes([value_len[0], value_len[1]]) as usize;
    let value = reader.take(value_len).context("Share value truncated")?.to_vec();

    let body_len = reader.position();
    let checksum = reader.take(4).context("Missing checksum")?;
    let actual_checksum = u32::from_be_bytes([checksum[0], checksum[1], checksum[2], checksum[3]]);
    let expected_checksum = CRC32.checksum(&payload[..body_len]);

    if expected_checksum != actual_checksum {
        bail!(
            "Checksum verification failed: expected 0x{expected_checksum:08x}, got 0x{actual_checksum:08x}"
        );
    }
    if !reader.is_empty() {
        bail!("Unexpected trailing data after checksum");
    }

    Ok(ShareToken::new(
        FieldElement::from_raw(value),
        indices,
        LineageId::from_bytes(lineage),
    ))
}

/// Sequential reader over a decoded payload
struct PayloadReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> PayloadReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position + len;
        if end > self.data.len() {
            bail!("Payload too short: need {end} bytes, got {}", self.data.len());
        }
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn position(&self) -> usize {
        self.position
    }

    fn is_empty(&self) -> bool {
        self.position == self.data.len()
    }
}

/// Encodes binary data as BIP39 words
///
/// Each word encodes 11 bits. Data is left-padded to align with 11-bit boundaries.
fn encode_data(data: &[u8]) -> Result<Vec<String>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let bit_count = data.len() * 8;
    let padding = (11 - (bit_count % 11)) % 11;
    let word_count = (bit_count + padding) / 11;

    let mut words = Vec::with_capacity(word_count);
    let mut bit_buffer: u16 = 0;
    // Padding bits are zeros, so starting the buffer part-full is enough
    let mut bits_in_buffer = padding;

    for &byte in data {
        for bit_pos in (0..8).rev() {
            let bit = (byte >> bit_pos) & 1;
            bit_buffer = (bit_buffer << 1) | u16::from(bit);
            bits_in_buffer += 1;

            if bits_in_buffer == 11 {
                words.push(word_from_index(bit_buffer as usize)?);
                bit_buffer = 0;
                bits_in_buffer = 0;
            }
        }
    }

    Ok(words)
}

/// Decodes BIP39 words back to `expected_bytes` bytes, skipping left padding
fn decode_data(words: &[String], expected_bytes: usize) -> Result<Zeroizing<Vec<u8>>> {
    let expected_bits = expected_bytes * 8;
    let total_bits = words.len() * 11;

    if total_bits < expected_bits {
        bail!("Not enough bits: got {total_bits}, expected at least {expected_bits}");
    }

    let padding = total_bits - expected_bits;

    let mut result = Zeroizing::new(Vec::with_capacity(expected_bytes));
    let mut bit_buffer: u16 = 0;
    let mut bits_in_buffer = 0;
    let mut bits_processed = 0;

    for word in words {
        let index = word_to_index(word)?;

        for bit_pos in (0..11).rev() {
            let bit = (index >> bit_pos) & 1;

            if bits_processed < padding {
                bits_processed += 1;
                continue;
            }

            #[allow(
                clippy::cast_possible_truncation,
                reason = "bit is guaranteed to be 0 or 1 from masking"
            )]
            let bit_u16 = bit as u16;
            bit_buffer = (bit_buffer << 1) | bit_u16;
            bits_in_buffer += 1;

            if bits_in_buffer == 8 {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "bit_buffer only contains 8 bits at this point"
                )]
                result.push(bit_buffer as u8);
                bit_buffer = 0;
                bits_in_buffer = 0;
            }

            bits_processed += 1;
        }
    }

    Ok(result)
}

/// Converts a BIP39 word to its index (0-2047)
fn word_to_index(word: &str) -> Result<usize> {
    let word_lower = word.to_lowercase();

    WORD_TO_INDEX_MAP
        .get(word_lower.as_str())
        .copied()
        .ok_or_else(|| anyhow!("Word '{word}' not found in BIP39 wordlist"))
}

/// Converts an index (0-2047) to its BIP39 word
fn word_from_index(index: usize) -> Result<String> {
    if index > 2047 {
        bail!("Word index {index} out of range (must be 0-2047)");
    }

    let wordlist = Language::English.word_list();
    Ok(wordlist[index].to_string())
}
