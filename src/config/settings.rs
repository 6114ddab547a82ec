use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use super::ConfigProvider;
use crate::errors::{FortError, Result};
use crate::vault::format::write_atomic;

/// Keys understood by Fort. Anything else in the file is kept as-is.
pub const KEY_DATAPATH: &str = "datapath";
pub const KEY_IDLE_INTERVAL: &str = "idleinterval";
pub const KEY_MINIMIZE_ON_CLOSE: &str = "minimizeonclose";
pub const KEY_FIRST_RUN: &str = "firstrun";

/// User configuration, loaded from a `fortrc` file of `key=value` lines.
///
/// Every key has a sensible default so Fort works out-of-the-box
/// without any config file at all. Line order and unknown keys are
/// preserved when the file is written back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

// ── Defaults ─────────────────────────────────────────────────────────

fn default_idle_interval() -> u32 {
    3
}

fn default_minimize_on_close() -> bool {
    false
}

// ── Implementation ───────────────────────────────────────────────────

impl Settings {
    /// Name of the config file inside the Fort home directory.
    pub const FILE_NAME: &'static str = "fortrc";

    /// Name of the Fort home directory under `$HOME`.
    pub const HOME_DIR: &'static str = ".fort";

    /// `$HOME/.fort/fortrc`.
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FortError::Config("cannot determine home directory".into()))?;
        Ok(home.join(Self::HOME_DIR).join(Self::FILE_NAME))
    }

    /// Load settings from `path`.
    ///
    /// If the file does not exist, defaults are returned and nothing
    /// is written.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = Self {
            path: path.to_path_buf(),
            entries: Vec::new(),
        };

        if !path.exists() {
            return Ok(settings);
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            FortError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        settings.entries = parse(&contents);

        debug!(path = %path.display(), keys = settings.entries.len(), "loaded settings");
        Ok(settings)
    }

    /// Load settings, creating the file with `firstrun=true` if it is
    /// missing.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        let mut settings = Self::load(path)?;
        if !path.exists() {
            settings.set_bool(KEY_FIRST_RUN, true);
            settings.save()?;
        }
        Ok(settings)
    }

    /// Write every entry back to the file, one `key=value` per line.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }

        write_atomic(&self.path, out.as_bytes())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw value for `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Only the literal `true` counts as true; anything else is false.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    /// Set `key`, replacing an existing entry in place or appending.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, if value { "true" } else { "false" });
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_first_run(&self) -> bool {
        self.get_bool(KEY_FIRST_RUN)
    }

    /// Auto-lock interval in minutes. Missing or invalid values fall
    /// back to the default of 3.
    pub fn idle_interval(&self) -> u32 {
        match self.get(KEY_IDLE_INTERVAL) {
            None => default_idle_interval(),
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = raw, "invalid idleinterval, using default");
                default_idle_interval()
            }),
        }
    }

    pub fn minimize_on_close(&self) -> bool {
        match self.get(KEY_MINIMIZE_ON_CLOSE) {
            None => default_minimize_on_close(),
            Some(_) => self.get_bool(KEY_MINIMIZE_ON_CLOSE),
        }
    }

    /// Directory holding the vault artifacts.
    ///
    /// `datapath` when set, otherwise the directory of the config file.
    pub fn vault_dir(&self) -> PathBuf {
        match self.get(KEY_DATAPATH).map(str::trim) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => self
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl ConfigProvider for Settings {
    fn data_dir(&self) -> PathBuf {
        self.vault_dir()
    }

    fn idle_interval_minutes(&self) -> u32 {
        self.idle_interval()
    }

    fn minimize_on_close(&self) -> bool {
        Settings::minimize_on_close(self)
    }
}

/// Parse `key=value` lines. The key ends at the first `=`, so values
/// may themselves contain `=`. Lines without one are ignored.
fn parse(contents: &str) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = Vec::new();

    for line in contents.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        // First occurrence wins, like a top-down lookup would.
        if entries.iter().any(|(k, _)| k == key) {
            continue;
        }
        entries.push((key.to_string(), value.to_string()));
    }

    entries
}

/// Idle threshold for a given interval; `None` disables auto-lock.
pub fn idle_threshold_for(minutes: u32) -> Option<Duration> {
    (minutes > 0).then(|| Duration::from_millis(u64::from(minutes) * 60_000))
}

// ── Tests ────────────────────────────────────────────────────────────
