//! PKCS#7 padding with a constant-time validity check on removal.

use subtle::{Choice, ConstantTimeEq, ConstantTimeGreater};

use cryptlib_common::{CipherError, BLOCK_LEN};

/// Extend `data` to a whole number of blocks.
///
/// Always appends between 1 and [`BLOCK_LEN`] bytes, each equal to the number
/// of bytes appended, so empty input becomes one full pad block.
pub fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_LEN - data.len() % BLOCK_LEN;
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    out.resize(data.len() + pad_len, pad_len as u8);
    out
}

/// Strip PKCS#7 padding from decrypted blocks.
///
/// The final block is inspected in full whatever its contents, and only the
/// combined verdict is branched on.
///
/// # Errors
///
/// Returns [`CipherError::InvalidPadding`] for any malformed padding, and for
/// input that is empty or not block-aligned.
pub fn unpad(data: &[u8]) -> Result<&[u8], CipherError> {
    if data.is_empty() || data.len() % BLOCK_LEN != 0 {
        return Err(CipherError::InvalidPadding);
    }
    let last_block = &data[data.len() - BLOCK_LEN..];
    let pad_byte = last_block[BLOCK_LEN - 1];

    let mut valid: Choice = pad_byte.ct_gt(&0) & !pad_byte.ct_gt(&(BLOCK_LEN as u8));
    for (i, byte) in last_block.iter().rev().enumerate() {
        let in_padding = pad_byte.ct_gt(&(i as u8));
        valid &= !in_padding | byte.ct_eq(&pad_byte);
    }

    if bool::from(valid) {
        Ok(&data[..data.len() - pad_byte as usize])
    } else {
        Err(CipherError::InvalidPadding)
    }
}
