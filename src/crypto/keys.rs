//! Session key derivation.
//!
//! The login fingerprint is the SHA-256 digest of the passphrase,
//! hex encoded in uppercase. The AES-256 key is the first 32 bytes of
//! that hex *text*, not the raw digest. Vaults written by earlier
//! releases depend on this exact construction.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use super::encryption::KEY_LEN;
use crate::errors::{FortError, Result};

/// Hex encoded SHA-256 digest of the passphrase.
///
/// Deterministic: the same passphrase always yields the same fingerprint.
pub fn derive_login_fingerprint(passphrase: &str) -> Zeroizing<String> {
    let digest = Sha256::digest(passphrase.as_bytes());
    Zeroizing::new(hex::encode_upper(digest))
}

/// Build the AES-256 key from a login fingerprint.
pub fn symmetric_key_from_fingerprint(fingerprint: &str) -> Result<SessionKey> {
    let text = fingerprint.as_bytes();
    if text.len() < KEY_LEN {
        return Err(FortError::Cipher(format!(
            "fingerprint must be at least {KEY_LEN} bytes, got {}",
            text.len()
        )));
    }

    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&text[..KEY_LEN]);

    Ok(SessionKey {
        bytes,
        fingerprint: fingerprint.to_string(),
    })
}

/// Symmetric key material for the current session.
///
/// Lives only in memory while the vault is unlocked and is wiped on
/// drop, so dropping the key is how the session forgets it.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SessionKey {
    bytes: [u8; KEY_LEN],
    fingerprint: String,
}

impl SessionKey {
    /// Derive the session key straight from a passphrase.
    pub fn from_passphrase(passphrase: &str) -> Result<Self> {
        symmetric_key_from_fingerprint(&derive_login_fingerprint(passphrase))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Compare against another fingerprint in constant time.
    pub fn matches_fingerprint(&self, fingerprint: &str) -> bool {
        self.fingerprint
            .as_bytes()
            .ct_eq(fingerprint.as_bytes())
            .into()
    }

    /// Overwrite the key material in place.
    pub fn clear(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}
