use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Fort.
#[derive(Debug, Error)]
pub enum FortError {
    // --- Passphrase errors ---
    #[error("Passphrase validation failed: {0}")]
    Validation(String),

    // --- Cipher errors ---
    #[error("Cipher error: {0}")]
    Cipher(String),

    // --- Vault errors ---
    #[error("Record file {path} is malformed: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid vault state: {0}")]
    State(String),

    #[error("Record '{0}' not found")]
    NotFound(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Passphrases do not match")]
    PasswordMismatch,
}

impl FortError {
    /// The generic failure reported for any batch decrypt problem.
    ///
    /// A wrong passphrase and corrupted ciphertext look identical.
    pub fn invalid_passphrase_or_corrupted() -> Self {
        Self::Cipher("invalid passphrase or corrupted data".into())
    }
}

/// Convenience type alias for Fort results.
pub type Result<T> = std::result::Result<T, FortError>;
