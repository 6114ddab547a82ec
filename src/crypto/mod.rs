//! Cryptographic primitives for Fort.
//!
//! This module provides:
//! - AES-256-CBC encryption and decryption of record artifacts (`encryption`)
//! - SHA-256 based session key derivation (`keys`)
//! - bcrypt master passphrase credential (`passphrase`)

pub mod encryption;
pub mod keys;
pub mod passphrase;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, SessionKey, ...};
pub use encryption::{decrypt, encrypt, InitializationVector};
pub use keys::{derive_login_fingerprint, symmetric_key_from_fingerprint, SessionKey};
pub use passphrase::PassphraseValidator;
