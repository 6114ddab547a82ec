//! Batch encryption of the whole vault directory.
//!
//! Locking encrypts every `*.plain` artifact under one fresh IV and
//! persists that IV to `fort.iv`; unlocking reverses it and removes
//! `fort.iv`. The presence of `fort.iv` is the single source of truth
//! for whether the vault is locked.
//!
//! Both directions are staged: every output is first written to a
//! hidden temp file. If any record fails, the temp files are removed
//! and the directory is left exactly as it was. Only when the whole
//! batch succeeded are the temp files renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::format::{self, list_encrypted_files, list_plain_files, staging_path, ENCRYPTED_SUFFIX, IV_FILE};
use crate::crypto::encryption::{decrypt, encrypt, InitializationVector};
use crate::crypto::keys::SessionKey;
use crate::errors::{FortError, Result};

/// Whether the record artifacts are currently encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    Unlocked,
    Locked,
}

impl std::fmt::Display for VaultState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlocked => f.write_str("unlocked"),
            Self::Locked => f.write_str("locked"),
        }
    }
}

/// One staged output: `temp` becomes `target`, then `source` goes away.
struct Staged {
    source: PathBuf,
    temp: PathBuf,
    target: PathBuf,
}

/// Encrypts and decrypts all records of a vault directory at once.
#[derive(Debug, Clone)]
pub struct VaultCipher {
    data_dir: PathBuf,
}

impl VaultCipher {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Path to `fort.iv`.
    pub fn iv_path(&self) -> PathBuf {
        self.data_dir.join(IV_FILE)
    }

    /// Current state, read from the presence of `fort.iv`.
    pub fn state(&self) -> VaultState {
        if self.iv_path().is_file() {
            VaultState::Locked
        } else {
            VaultState::Unlocked
        }
    }

    /// Encrypt every plaintext record and persist a fresh IV.
    pub fn lock(&self, key: &SessionKey) -> Result<()> {
        if self.state() == VaultState::Locked {
            return Err(FortError::State("vault is already locked".into()));
        }

        let iv = InitializationVector::generate();
        let sources = list_plain_files(&self.data_dir).map_err(lock_error)?;

        let mut staged = Vec::with_capacity(sources.len());
        for source in sources {
            match stage_encrypted(&source, key, &iv) {
                Ok(entry) => staged.push(entry),
                Err(e) => {
                    discard(&staged);
                    return Err(lock_error(e));
                }
            }
        }

        // The IV goes in first: if a rename below fails, the records
        // already converted can still be decrypted.
        format::write_atomic(&self.iv_path(), iv.to_hex().as_bytes()).map_err(|e| {
            discard(&staged);
            lock_error(e)
        })?;
        commit(&staged).map_err(lock_error)?;

        info!(records = staged.len(), "vault locked");
        Ok(())
    }

    /// Decrypt every encrypted record and remove the persisted IV.
    ///
    /// A wrong key and corrupted data both fail with the same error.
    pub fn unlock(&self, key: &SessionKey) -> Result<()> {
        if self.state() == VaultState::Unlocked {
            return Err(FortError::State("vault is not locked".into()));
        }

        let iv = fs::read_to_string(self.iv_path())
            .map_err(FortError::from)
            .and_then(|text| InitializationVector::from_hex(&text))
            .map_err(unlock_error)?;

        let sources = list_encrypted_files(&self.data_dir).map_err(unlock_error)?;

        let mut staged = Vec::with_capacity(sources.len());
        for source in sources {
            match stage_decrypted(&source, key, &iv) {
                Ok(entry) => staged.push(entry),
                Err(e) => {
                    discard(&staged);
                    return Err(unlock_error(e));
                }
            }
        }

        commit(&staged).map_err(unlock_error)?;
        format::remove_if_exists(&self.iv_path()).map_err(unlock_error)?;

        info!(records = staged.len(), "vault unlocked");
        Ok(())
    }
}

/// Encrypt `source` into a temp file next to `<source>.enc`.
fn stage_encrypted(source: &Path, key: &SessionKey, iv: &InitializationVector) -> Result<Staged> {
    let plaintext = zeroize::Zeroizing::new(fs::read(source)?);
    let encoded = encrypt(key.as_bytes(), iv, &plaintext);

    let mut target = source.as_os_str().to_owned();
    target.push(ENCRYPTED_SUFFIX);
    let target = PathBuf::from(target);
    let temp = staging_path(&target);

    format::write_private(&temp, encoded.as_bytes())?;
    debug!(file = %source.display(), "staged encrypted record");

    Ok(Staged {
        source: source.to_path_buf(),
        temp,
        target,
    })
}

/// Decrypt `source` into a temp file next to the stripped name.
fn stage_decrypted(source: &Path, key: &SessionKey, iv: &InitializationVector) -> Result<Staged> {
    let encoded = fs::read_to_string(source)?;
    let plaintext = decrypt(key.as_bytes(), iv, &encoded)?;

    let name = source.to_string_lossy();
    let target = PathBuf::from(
        name.strip_suffix(ENCRYPTED_SUFFIX)
            .ok_or_else(FortError::invalid_passphrase_or_corrupted)?,
    );
    let temp = staging_path(&target);

    format::write_private(&temp, &plaintext)?;
    debug!(file = %source.display(), "staged decrypted record");

    Ok(Staged {
        source: source.to_path_buf(),
        temp,
        target,
    })
}

/// Move every staged file into place and remove its source.
fn commit(staged: &[Staged]) -> Result<()> {
    for entry in staged {
        fs::rename(&entry.temp, &entry.target)?;
        fs::remove_file(&entry.source)?;
    }
    Ok(())
}

/// Best-effort cleanup of temp files after a failed batch.
fn discard(staged: &[Staged]) {
    for entry in staged {
        let _ = fs::remove_file(&entry.temp);
    }
}

fn lock_error(e: FortError) -> FortError {
    match e {
        FortError::Cipher(_) | FortError::State(_) => e,
        other => FortError::Cipher(format!("corrupted data or permission error: {other}")),
    }
}

fn unlock_error(e: FortError) -> FortError {
    debug!(error = %e, "unlock failed");
    FortError::invalid_passphrase_or_corrupted()
}
