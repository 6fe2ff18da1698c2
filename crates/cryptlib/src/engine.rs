//! AES-CBC encryption and decryption with a random IV carried in the output.
//!
//! **Mode:** AES-128/192/256 (chosen by key length) in CBC mode with PKCS#7
//! padding. CBC provides no integrity; tampering surfaces as
//! [`CipherError::InvalidPadding`] in the overwhelming majority of cases, and
//! that check runs in constant time.
//!
//! **IVs must never repeat under one key.** The random-IV operations draw a
//! fresh IV on every call. The explicit-IV operations exist for
//! interoperability with peers that agree on an IV out of band.

use aes::{Aes128, Aes192, Aes256};
use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use cryptlib_common::{decode_base64, CipherError, EncodedCiphertext, BLOCK_LEN};

use crate::config::EngineConfig;
use crate::iv::{Iv, IvSource, OsIvSource};
use crate::key::{CipherKey, KeySize};
use crate::padding::{pad, unpad};

/// Stateless encryption service.
///
/// Holds only immutable configuration and an IV source, so one engine may be
/// shared across threads without locking.
#[derive(Debug, Clone, Default)]
pub struct CipherEngine<S: IvSource = OsIvSource> {
    config: EngineConfig,
    iv_source: S,
}

impl CipherEngine<OsIvSource> {
    /// Engine that uses key bytes directly (16, 24 or 32 bytes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the given configuration and the OS random source.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`EngineConfig::validate`].
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        Self::with_iv_source(config, OsIvSource)
    }
}

impl<S: IvSource> CipherEngine<S> {
    /// Engine with an explicit IV source.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`EngineConfig::validate`].
    pub fn with_iv_source(config: EngineConfig, iv_source: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, iv_source })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Encrypt `plaintext` under a freshly generated random IV.
    ///
    /// Returns `base64(iv ++ ciphertext)`.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] if `key` is unusable (checked
    /// before any IV is drawn) or [`CipherError::RandomSourceUnavailable`] if
    /// the IV source fails.
    #[instrument(skip_all, fields(plaintext_len = plaintext.len()))]
    pub fn encrypt_with_random_iv(&self, plaintext: &[u8], key: &[u8]) -> Result<String, CipherError> {
        let key = self.derive_key(key)?;

        let mut iv = [0u8; BLOCK_LEN];
        self.iv_source.fill(&mut iv)?;

        let padded = Zeroizing::new(pad(plaintext));
        let envelope = EncodedCiphertext::new(iv, cbc_encrypt(&key, &iv, &padded))?;
        debug!(
            ciphertext_len = envelope.ciphertext().len(),
            "encrypted with random IV"
        );
        Ok(envelope.encode())
    }

    /// Decrypt a value produced by [`CipherEngine::encrypt_with_random_iv`].
    ///
    /// # Errors
    ///
    /// - [`CipherError::InvalidKeyLength`] if `key` is unusable.
    /// - [`CipherError::InvalidEncoding`] if `encoded` is not base64.
    /// - [`CipherError::TruncatedInput`] if it decodes to less than an IV plus
    ///   one block, or to a partial block.
    /// - [`CipherError::InvalidPadding`] if padding fails to verify (wrong key
    ///   or tampered data).
    #[instrument(skip_all, fields(encoded_len = encoded.len()))]
    pub fn decrypt_with_random_iv(&self, encoded: &str, key: &[u8]) -> Result<Vec<u8>, CipherError> {
        let key = self.derive_key(key)?;
        let envelope = EncodedCiphertext::decode(encoded)?;
        let plaintext = cbc_decrypt(&key, envelope.iv(), envelope.ciphertext())?;
        debug!(plaintext_len = plaintext.len(), "decrypted with random IV");
        Ok(plaintext)
    }

    /// Encrypt `plaintext` under a caller-supplied IV.
    ///
    /// Returns `base64(ciphertext)`; the IV is not included and must be
    /// supplied again to [`CipherEngine::decrypt_with_iv`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] if `key` is unusable.
    #[instrument(skip_all, fields(plaintext_len = plaintext.len()))]
    pub fn encrypt_with_iv(&self, plaintext: &[u8], key: &[u8], iv: &Iv) -> Result<String, CipherError> {
        let key = self.derive_key(key)?;
        let padded = Zeroizing::new(pad(plaintext));
        Ok(STANDARD.encode(cbc_encrypt(&key, &iv.0, &padded)))
    }

    /// Decrypt a value produced by [`CipherEngine::encrypt_with_iv`].
    ///
    /// # Errors
    ///
    /// As [`CipherEngine::decrypt_with_random_iv`], except that
    /// [`CipherError::TruncatedInput`] requires only one whole block.
    #[instrument(skip_all, fields(encoded_len = encoded.len()))]
    pub fn decrypt_with_iv(&self, encoded: &str, key: &[u8], iv: &Iv) -> Result<Vec<u8>, CipherError> {
        let key = self.derive_key(key)?;
        let ciphertext = decode_base64(encoded)?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CipherError::TruncatedInput(ciphertext.len()));
        }
        cbc_decrypt(&key, &iv.0, &ciphertext)
    }

    /// Text form of [`CipherEngine::encrypt_with_random_iv`].
    ///
    /// # Errors
    ///
    /// As [`CipherEngine::encrypt_with_random_iv`].
    pub fn encrypt_plain_text_with_random_iv(&self, plain_text: &str, key: &str) -> Result<String, CipherError> {
        self.encrypt_with_random_iv(plain_text.as_bytes(), key.as_bytes())
    }

    /// Text form of [`CipherEngine::decrypt_with_random_iv`].
    ///
    /// # Errors
    ///
    /// As [`CipherEngine::decrypt_with_random_iv`], plus
    /// [`CipherError::InvalidUtf8`] if the plaintext is not UTF-8.
    pub fn decrypt_cipher_text_with_random_iv(&self, cipher_text: &str, key: &str) -> Result<String, CipherError> {
        let bytes = self.decrypt_with_random_iv(cipher_text, key.as_bytes())?;
        String::from_utf8(bytes).map_err(|_| CipherError::InvalidUtf8)
    }

    /// Text form of [`CipherEngine::encrypt_with_iv`], with the IV built by
    /// [`Iv::from_text`].
    ///
    /// # Errors
    ///
    /// As [`CipherEngine::encrypt_with_iv`].
    pub fn encrypt_plain_text(&self, plain_text: &str, key: &str, iv: &str) -> Result<String, CipherError> {
        self.encrypt_with_iv(plain_text.as_bytes(), key.as_bytes(), &Iv::from_text(iv))
    }

    /// Text form of [`CipherEngine::decrypt_with_iv`], with the IV built by
    /// [`Iv::from_text`].
    ///
    /// # Errors
    ///
    /// As [`CipherEngine::decrypt_with_iv`], plus [`CipherError::InvalidUtf8`]
    /// if the plaintext is not UTF-8.
    pub fn decrypt_cipher_text(&self, cipher_text: &str, key: &str, iv: &str) -> Result<String, CipherError> {
        let bytes = self.decrypt_with_iv(cipher_text, key.as_bytes(), &Iv::from_text(iv))?;
        String::from_utf8(bytes).map_err(|_| CipherError::InvalidUtf8)
    }

    fn derive_key(&self, key: &[u8]) -> Result<CipherKey, CipherError> {
        self.config
            .key_derivation
            .derive(key, self.config.derived_key_len)
    }
}

fn cbc_encrypt(key: &CipherKey, iv: &[u8; BLOCK_LEN], padded: &[u8]) -> Vec<u8> {
    let k = key.as_bytes();
    match key.size() {
        KeySize::Aes128 => cbc::Encryptor::<Aes128>::new(k.into(), iv.as_slice().into())
            .encrypt_padded_vec_mut::<NoPadding>(padded),
        KeySize::Aes192 => cbc::Encryptor::<Aes192>::new(k.into(), iv.as_slice().into())
            .encrypt_padded_vec_mut::<NoPadding>(padded),
        KeySize::Aes256 => cbc::Encryptor::<Aes256>::new(k.into(), iv.as_slice().into())
            .encrypt_padded_vec_mut::<NoPadding>(padded),
    }
}

fn cbc_decrypt(key: &CipherKey, iv: &[u8; BLOCK_LEN], ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let k = key.as_bytes();
    let blocks = match key.size() {
        KeySize::Aes128 => cbc::Decryptor::<Aes128>::new(k.into(), iv.as_slice().into())
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext),
        KeySize::Aes192 => cbc::Decryptor::<Aes192>::new(k.into(), iv.as_slice().into())
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext),
        KeySize::Aes256 => cbc::Decryptor::<Aes256>::new(k.into(), iv.as_slice().into())
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext),
    }
    .map_err(|_| CipherError::TruncatedInput(ciphertext.len()))?;

    let blocks = Zeroizing::new(blocks);
    let plaintext = unpad(&blocks)?;
    Ok(plaintext.to_vec())
}
