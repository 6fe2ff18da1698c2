//! Error taxonomy shared by the cipher engine and envelope parsing.

use thiserror::Error;

/// Errors produced by encryption, decryption, and envelope handling.
///
/// Every variant is surfaced to the caller as-is. Variants carry only lengths,
/// never key material or plaintext.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// The key is not 16, 24, or 32 bytes long.
    #[error("invalid key length: {0} bytes (expected 16, 24 or 32)")]
    InvalidKeyLength(usize),

    /// The encoded ciphertext is not valid base64.
    #[error("ciphertext is not valid base64")]
    InvalidEncoding,

    /// The decoded input is shorter than required, or ends in a partial block.
    #[error("ciphertext truncated: {0} bytes is not a whole number of blocks after the IV")]
    TruncatedInput(usize),

    /// PKCS#7 padding did not verify after decryption.
    #[error("invalid padding")]
    InvalidPadding,

    /// The operating system random source could not supply an IV.
    #[error("secure random source unavailable")]
    RandomSourceUnavailable,

    /// Decrypted bytes were requested as text but are not UTF-8.
    #[error("decrypted plaintext is not valid UTF-8")]
    InvalidUtf8,
}

impl CipherError {
    /// Returns a short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CipherError::InvalidKeyLength(_) => "invalid_key_length",
            CipherError::InvalidEncoding => "invalid_encoding",
            CipherError::TruncatedInput(_) => "truncated_input",
            CipherError::InvalidPadding => "invalid_padding",
            CipherError::RandomSourceUnavailable => "random_source_unavailable",
            CipherError::InvalidUtf8 => "invalid_utf8",
        }
    }

    /// Returns `true` for errors that indicate malformed or tampered input.
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            CipherError::InvalidEncoding
                | CipherError::TruncatedInput(_)
                | CipherError::InvalidPadding
                | CipherError::InvalidUtf8
        )
    }
}
