//! Transportable envelope combining a random IV with CBC ciphertext.
//!
//! # Wire format
//!
//! ```text
//! base64( iv[16] ++ ciphertext[N * 16] )
//! ```
//!
//! Standard RFC 4648 alphabet with `=` padding. The IV always occupies the
//! first [`BLOCK_LEN`] bytes of the decoded value.

use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CipherError;

/// AES block size, and therefore the IV length (16 bytes = 128 bits).
pub const BLOCK_LEN: usize = 16;

/// Minimum decoded length of a valid envelope: the IV plus one block.
pub const MIN_ENVELOPE_LEN: usize = 2 * BLOCK_LEN;

/// A parsed encrypted value: the IV and the raw ciphertext blocks.
///
/// Fields are private so every value holds at least one whole ciphertext
/// block, and anything [`EncodedCiphertext::encode`] writes can be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCiphertext {
    iv: [u8; BLOCK_LEN],
    ciphertext: Vec<u8>,
}

impl EncodedCiphertext {
    /// Build an envelope from an IV and ciphertext blocks.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::TruncatedInput`] (carrying the combined length)
    /// if `ciphertext` is empty or ends in a partial block.
    pub fn new(iv: [u8; BLOCK_LEN], ciphertext: Vec<u8>) -> Result<Self, CipherError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CipherError::TruncatedInput(BLOCK_LEN + ciphertext.len()));
        }
        Ok(Self { iv, ciphertext })
    }

    /// Raw IV bytes.
    pub fn iv(&self) -> &[u8; BLOCK_LEN] {
        &self.iv
    }

    /// Raw ciphertext bytes, a non-zero multiple of [`BLOCK_LEN`].
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Serialise to `iv ++ ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BLOCK_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split `iv ++ ciphertext` at the fixed block offset.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::TruncatedInput`] if `bytes` is shorter than
    /// [`MIN_ENVELOPE_LEN`] or the ciphertext part ends in a partial block.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() < MIN_ENVELOPE_LEN || bytes.len() % BLOCK_LEN != 0 {
            return Err(CipherError::TruncatedInput(bytes.len()));
        }
        let (iv_bytes, ciphertext) = bytes.split_at(BLOCK_LEN);
        let mut iv = [0u8; BLOCK_LEN];
        iv.copy_from_slice(iv_bytes);
        Self::new(iv, ciphertext.to_vec())
    }

    /// Encode this value to its printable base64 form.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse a printable base64 envelope.
    ///
    /// ASCII whitespace is ignored, so line-wrapped base64 is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidEncoding`] if the text is not base64, or
    /// [`CipherError::TruncatedInput`] if the decoded bytes are too short.
    pub fn decode(encoded: &str) -> Result<Self, CipherError> {
        let bytes = decode_base64(encoded)?;
        Self::from_bytes(&bytes)
    }
}

/// Decode standard base64, skipping ASCII whitespace.
///
/// # Errors
///
/// Returns [`CipherError::InvalidEncoding`] on any alphabet or padding error.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, CipherError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|_| CipherError::InvalidEncoding)
}

impl fmt::Display for EncodedCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for EncodedCiphertext {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for EncodedCiphertext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for EncodedCiphertext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(de::Error::custom)
    }
}
