//! AES-CBC encryption with a fresh random IV embedded in a printable envelope.
//!
//! # Ciphertext format
//!
//! ```text
//! base64( iv[16] ++ aes_cbc_pkcs7(plaintext) )
//! ```
//!
//! The IV is drawn from the OS CSPRNG on every call, so encrypting the same
//! plaintext twice under one key yields different output.
//!
//! # Security invariants
//!
//! - Key bytes are zeroed on drop and never appear in `Debug` output, logs, or
//!   span fields.
//! - Padding failures are always reported as [`CipherError::InvalidPadding`],
//!   decided by a constant-time check.

pub mod config;
pub mod engine;
pub mod iv;
pub mod key;
pub mod padding;

pub use config::EngineConfig;
pub use cryptlib_common::{CipherError, EncodedCiphertext, BLOCK_LEN};
pub use engine::CipherEngine;
pub use iv::{generate_random_iv16, Iv, IvSource, OsIvSource};
pub use key::{sha256_hex, CipherKey, KeyDerivation, KeySize};
