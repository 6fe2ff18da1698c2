//! [`CipherKey`]: validated AES key material, and the derivations that produce it.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use cryptlib_common::CipherError;

/// Accepted AES key lengths in bytes.
pub const KEY_LENS: [usize; 3] = [16, 24, 32];

/// AES variant selected by the key length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    /// Map a byte length to its AES variant.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] for anything but 16, 24 or 32.
    pub fn from_len(len: usize) -> Result<Self, CipherError> {
        match len {
            16 => Ok(KeySize::Aes128),
            24 => Ok(KeySize::Aes192),
            32 => Ok(KeySize::Aes256),
            other => Err(CipherError::InvalidKeyLength(other)),
        }
    }

    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            KeySize::Aes128 => 16,
            KeySize::Aes192 => 24,
            KeySize::Aes256 => 32,
        }
    }
}

/// AES key bytes of a validated length.
///
/// The buffer is overwritten with zeroes when dropped.
#[derive(Clone)]
pub struct CipherKey {
    bytes: Zeroizing<Vec<u8>>,
    size: KeySize,
}

impl CipherKey {
    /// Copy `bytes` into a new key.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] if `bytes` is not 16, 24 or 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        let size = KeySize::from_len(bytes.len())?;
        Ok(Self {
            bytes: Zeroizing::new(bytes.to_vec()),
            size,
        })
    }

    pub fn size(&self) -> KeySize {
        self.size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        write!(f, "CipherKey({:?}, [REDACTED])", self.size)
    }
}

/// How caller-supplied key bytes become a [`CipherKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyDerivation {
    /// Use the bytes directly; they must already be a valid AES key length.
    #[default]
    Raw,
    /// Hash with SHA-256, hex-encode, and use the leading hex characters as
    /// the key bytes. Accepts secrets of any length.
    Sha256Hex,
}

impl KeyDerivation {
    /// Produce a key from `secret`.
    ///
    /// `derived_len` is only consulted by [`KeyDerivation::Sha256Hex`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] if the resulting key length
    /// is not accepted.
    pub fn derive(self, secret: &[u8], derived_len: usize) -> Result<CipherKey, CipherError> {
        match self {
            KeyDerivation::Raw => CipherKey::from_bytes(secret),
            KeyDerivation::Sha256Hex => {
                KeySize::from_len(derived_len)?;
                let digest = Zeroizing::new(sha256_hex_bytes(secret));
                CipherKey::from_bytes(&digest.as_bytes()[..derived_len])
            }
        }
    }
}

/// Lowercase hex SHA-256 of `text`, truncated to `length` characters.
///
/// The full 64-character digest is returned when `length` is 64 or more.
pub fn sha256_hex(text: &str, length: usize) -> String {
    let mut digest = sha256_hex_bytes(text.as_bytes());
    digest.truncate(length);
    digest
}

fn sha256_hex_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_lengths() {
        for len in KEY_LENS {
            let key = CipherKey::from_bytes(&vec![7u8; len]).unwrap();
            assert_eq!(key.size().key_len(), len);
        }
    }

    #[test]
    fn rejects_other_lengths() {
        for len in [0, 1, 15, 17, 27, 31, 33, 64] {
            assert_eq!(
                CipherKey::from_bytes(&vec![0u8; len]).unwrap_err(),
                CipherError::InvalidKeyLength(len)
            );
        }
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = CipherKey::from_bytes(&[0xAB; 16]).unwrap();
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("171"));
    }

    #[test]
    fn sha256_hex_known_digest() {
        assert_eq!(
            sha256_hex("abc", 64),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha256_hex("abc", 32), "ba7816bf8f01cfea414140de5dae2223");
        assert_eq!(sha256_hex("abc", 100).len(), 64);
    }

    #[test]
    fn sha256_hex_derivation_accepts_any_secret_length() {
        let secret = b"BlVssQKxzAHFAUNZbqvwS+yKw/m";
        let key = KeyDerivation::Sha256Hex.derive(secret, 32).unwrap();
        assert_eq!(key.size(), KeySize::Aes256);
        let expected = sha256_hex("BlVssQKxzAHFAUNZbqvwS+yKw/m", 32);
        assert_eq!(key.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn sha256_hex_derivation_honours_derived_len() {
        let key = KeyDerivation::Sha256Hex.derive(b"secret", 16).unwrap();
        assert_eq!(key.size(), KeySize::Aes128);
        assert!(KeyDerivation::Sha256Hex.derive(b"secret", 20).is_err());
    }

    #[test]
    fn raw_derivation_validates_length() {
        assert!(KeyDerivation::Raw.derive(&[1u8; 24], 32).is_ok());
        assert_eq!(
            KeyDerivation::Raw.derive(b"BlVssQKxzAHFAUNZbqvwS+yKw/m", 32).unwrap_err(),
            CipherError::InvalidKeyLength(27)
        );
    }
}
