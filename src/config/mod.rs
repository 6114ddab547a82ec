//! Configuration consumed by the vault core.
//!
//! The core only depends on the `ConfigProvider` trait; `Settings` is
//! the file-backed implementation used by the CLI.

pub mod settings;

use std::path::PathBuf;
use std::time::Duration;

pub use settings::Settings;

/// Where the vault lives and how the lock state machine behaves.
pub trait ConfigProvider {
    /// Directory holding the record, IV and passphrase artifacts.
    fn data_dir(&self) -> PathBuf;

    /// Auto-lock interval in minutes. `0` disables auto-lock.
    fn idle_interval_minutes(&self) -> u32;

    /// Whether closing the host should lock instead of exiting.
    fn minimize_on_close(&self) -> bool;

    /// Idle duration at which the vault locks itself.
    fn idle_threshold(&self) -> Option<Duration> {
        settings::idle_threshold_for(self.idle_interval_minutes())
    }
}

/// Fixed in-memory configuration.
#[derive(Debug, Clone)]
pub struct StaticConfig {
    pub data_dir: PathBuf,
    pub idle_interval_minutes: u32,
    pub minimize_on_close: bool,
}

impl StaticConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            idle_interval_minutes: 3,
            minimize_on_close: false,
        }
    }
}

impl ConfigProvider for StaticConfig {
    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn idle_interval_minutes(&self) -> u32 {
        self.idle_interval_minutes
    }

    fn minimize_on_close(&self) -> bool {
        self.minimize_on_close
    }
}
