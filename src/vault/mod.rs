//! Vault module: credential records and their storage.
//!
//! This module provides:
//! - `Record` and `RecordDraft` types (`record`)
//! - The on-disk artifact layout and record encoding (`format`)
//! - The in-memory `RecordStore` (`store`)
//! - Whole-directory lock/unlock via `VaultCipher` (`cipher`)
//! - Plaintext export via `DataExporter` (`export`)

pub mod cipher;
pub mod export;
pub mod format;
pub mod record;
pub mod store;

// Re-export the most commonly used items.
pub use cipher::{VaultCipher, VaultState};
pub use export::{DataExporter, ExportFormat};
pub use record::{Record, RecordDraft};
pub use store::{LoadReport, RecordStore};
