//! Initialization vectors: the random source for fresh IVs, and IVs built from text.

use rand::{rngs::OsRng, RngCore};

use cryptlib_common::{CipherError, BLOCK_LEN};

/// Source of fresh IVs for the engine.
#[cfg_attr(test, mockall::automock)]
pub trait IvSource {
    /// Overwrite `iv` with new random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::RandomSourceUnavailable`] if no secure randomness
    /// could be obtained.
    fn fill(&self, iv: &mut [u8; BLOCK_LEN]) -> Result<(), CipherError>;
}

/// [`IvSource`] backed by the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsIvSource;

impl IvSource for OsIvSource {
    fn fill(&self, iv: &mut [u8; BLOCK_LEN]) -> Result<(), CipherError> {
        OsRng
            .try_fill_bytes(iv)
            .map_err(|_| CipherError::RandomSourceUnavailable)
    }
}

/// A caller-supplied IV for the explicit-IV operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv(pub [u8; BLOCK_LEN]);

impl Iv {
    /// Build an IV from text: its UTF-8 bytes, truncated to [`BLOCK_LEN`] or
    /// zero-filled up to it.
    pub fn from_text(text: &str) -> Self {
        let bytes = text.as_bytes();
        let len = bytes.len().min(BLOCK_LEN);
        let mut iv = [0u8; BLOCK_LEN];
        iv[..len].copy_from_slice(&bytes[..len]);
        Iv(iv)
    }
}

impl From<[u8; BLOCK_LEN]> for Iv {
    fn from(bytes: [u8; BLOCK_LEN]) -> Self {
        Iv(bytes)
    }
}

/// Generate 16 lowercase hex characters from 8 random bytes.
///
/// Suitable as the text passed to [`Iv::from_text`].
///
/// # Errors
///
/// Returns [`CipherError::RandomSourceUnavailable`] if the OS CSPRNG fails.
pub fn generate_random_iv16() -> Result<String, CipherError> {
    let mut bytes = [0u8; BLOCK_LEN / 2];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| CipherError::RandomSourceUnavailable)?;
    Ok(hex::encode(bytes))
}
