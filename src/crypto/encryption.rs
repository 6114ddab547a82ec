//! AES-256-CBC encryption of record artifacts.
//!
//! Ciphertext is PKCS7 padded and stored as a single base64 line.
//! The initialization vector is supplied by the caller: one IV is
//! generated per lock operation and persisted next to the records as
//! uppercase hex text.

use aes::Aes256;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::errors::{FortError, Result};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Length of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the CBC initialization vector in bytes (128 bits).
pub const IV_LEN: usize = 16;

/// A 128-bit CBC initialization vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializationVector([u8; IV_LEN]);

impl InitializationVector {
    /// Generate a fresh random IV.
    pub fn generate() -> Self {
        let mut bytes = [0u8; IV_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; IV_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }

    /// Text form written to `fort.iv`: 32 uppercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse the text form, ignoring surrounding whitespace.
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = hex::decode(text.trim())
            .map_err(|e| FortError::Cipher(format!("initialization vector is not hex: {e}")))?;

        let bytes: [u8; IV_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            FortError::Cipher(format!(
                "initialization vector must be {IV_LEN} bytes, got {}",
                v.len()
            ))
        })?;

        Ok(Self(bytes))
    }
}

/// Encrypt `plaintext` and return the base64 encoded ciphertext.
pub fn encrypt(key: &[u8; KEY_LEN], iv: &InitializationVector, plaintext: &[u8]) -> String {
    let ciphertext =
        Aes256CbcEnc::new(key.into(), iv.as_bytes().into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    BASE64.encode(ciphertext)
}

/// Decrypt base64 text produced by `encrypt`.
///
/// Every failure (bad base64, wrong length, bad padding) maps to the
/// same error: a wrong key is indistinguishable from corruption.
pub fn decrypt(
    key: &[u8; KEY_LEN],
    iv: &InitializationVector,
    encoded: &str,
) -> Result<Zeroizing<Vec<u8>>> {
    let ciphertext = BASE64
        .decode(encoded.trim())
        .map_err(|_| FortError::invalid_passphrase_or_corrupted())?;

    let plaintext = Aes256CbcDec::new(key.into(), iv.as_bytes().into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| FortError::invalid_passphrase_or_corrupted())?;

    Ok(Zeroizing::new(plaintext))
}
