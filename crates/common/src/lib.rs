//! Common types, wire format definitions, and errors shared across `cryptlib` crates.

pub mod envelope;
pub mod error;

pub use envelope::{decode_base64, EncodedCiphertext, BLOCK_LEN, MIN_ENVELOPE_LEN};
pub use error::CipherError;
