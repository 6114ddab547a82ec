//! Master passphrase credential.
//!
//! The passphrase is never stored. A bcrypt hash (work factor 12) is
//! kept as the only line of `fort.pph` and checked on every login.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{FortError, Result};
use crate::vault::format::write_atomic;

/// File name of the credential artifact inside the vault directory.
pub const PASSPHRASE_FILE: &str = "fort.pph";

/// bcrypt work factor used for the stored credential.
pub const BCRYPT_COST: u32 = 12;

/// Every bcrypt hash is encoded in exactly this many characters.
const BCRYPT_HASH_LEN: usize = 60;

/// Creates and verifies the master passphrase credential.
#[derive(Debug, Clone)]
pub struct PassphraseValidator {
    path: PathBuf,
    cost: u32,
}

impl PassphraseValidator {
    /// Validator for the credential stored in `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_cost(data_dir, BCRYPT_COST)
    }

    /// Same as `new` with an explicit bcrypt work factor.
    ///
    /// Verification reads the cost from the stored hash, so this only
    /// affects hashes written by `setup`.
    pub fn with_cost(data_dir: &Path, cost: u32) -> Self {
        Self {
            path: data_dir.join(PASSPHRASE_FILE),
            cost,
        }
    }

    /// Path to `fort.pph`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` once a credential has been written.
    pub fn is_configured(&self) -> bool {
        self.path.is_file()
    }

    /// Hash `passphrase` and make it the only valid credential.
    ///
    /// Any existing credential is overwritten.
    pub fn setup(&self, passphrase: &str) -> Result<()> {
        let hash = bcrypt::hash(passphrase, self.cost)
            .map_err(|e| FortError::Validation(format!("unable to hash passphrase: {e}")))?;

        write_atomic(&self.path, hash.as_bytes())?;
        debug!(path = %self.path.display(), "master passphrase credential written");
        Ok(())
    }

    /// Check `passphrase` against the stored credential.
    pub fn validate(&self, passphrase: &str) -> Result<()> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FortError::Validation("missing credential".into()));
            }
            Err(e) => return Err(FortError::Io(e)),
        };

        let hash = contents.lines().next().unwrap_or_default();
        if hash.len() != BCRYPT_HASH_LEN {
            return Err(FortError::Validation("malformed hash".into()));
        }

        // bcrypt::verify compares the digests in constant time.
        match bcrypt::verify(passphrase, hash) {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!("passphrase rejected");
                Err(FortError::Validation("mismatch".into()))
            }
            Err(_) => Err(FortError::Validation("malformed hash".into())),
        }
    }

    /// Replace the credential after proving knowledge of the current one.
    pub fn change_passphrase(&self, current: &str, new: &str) -> Result<()> {
        self.validate(current)?;
        self.setup(new)
    }
}
