//! CLI module: Clap argument parser, output helpers, terminal host and
//! command implementations.

pub mod commands;
pub mod host;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{FortError, Result};
use crate::session::{IdleUnavailable, LockStateMachine};
use crate::vault::{RecordStore, VaultState};
use host::TerminalPrompt;

/// Minimum passphrase length to prevent trivially weak passphrases.
const MIN_PASSPHRASE_LEN: usize = 8;

/// Environment variable holding the master passphrase (scripts, CI).
pub const PASSPHRASE_ENV: &str = "FORT_PASSPHRASE";

/// Environment variable holding the new passphrase for `passwd`.
pub const NEW_PASSPHRASE_ENV: &str = "FORT_NEW_PASSPHRASE";

/// Fort CLI: a local password vault with records encrypted at rest.
#[derive(Parser)]
#[command(
    name = "fort",
    about = "Local password vault with records encrypted at rest",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.fort/fortrc)
    #[arg(long, env = "FORT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Set up the master passphrase for a new vault
    Init,

    /// Show vault location, lock state and settings
    Status,

    /// Add a record
    Add {
        /// Record title
        title: String,
        /// Login name
        #[arg(short, long, default_value = "")]
        username: String,
        /// Website address (http:// is added if no scheme is given)
        #[arg(long, default_value = "")]
        url: String,
        /// Free-form notes
        #[arg(short, long, default_value = "")]
        notes: String,
        /// Mark as favorite (listed first)
        #[arg(short, long)]
        favorite: bool,
    },

    /// List records, favorites first
    List {
        /// Only show records whose title contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one record
    Show {
        /// Record title
        title: String,
        /// Print the password instead of masking it
        #[arg(long)]
        reveal: bool,
    },

    /// Copy a field of a record to the clipboard
    Copy {
        /// Record title
        title: String,
        /// Field to copy
        #[arg(long, value_enum, default_value = "password")]
        field: commands::copy::Field,
    },

    /// Edit a record (prompts for each field unless flags are given)
    Edit {
        /// Title of the record to edit
        title: String,
        /// New title
        #[arg(long)]
        new_title: Option<String>,
        /// New login name
        #[arg(short, long)]
        username: Option<String>,
        /// New website address
        #[arg(long)]
        url: Option<String>,
        /// New notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Prompt for a new password
        #[arg(short, long)]
        password: bool,
    },

    /// Toggle the favorite flag of a record
    Favorite {
        /// Record title
        title: String,
    },

    /// Remove a record
    Remove {
        /// Record title
        title: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Encrypt all records on disk
    Lock,

    /// Decrypt all records on disk
    Unlock,

    /// Change the master passphrase
    Passwd,

    /// Export records as plain text or JSON
    Export {
        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export only the record with this title (text format)
        #[arg(short, long, requires = "output")]
        title: Option<String>,
    },

    /// Read or change settings
    Config {
        /// Setting name (datapath, idleinterval, minimizeonclose)
        key: Option<String>,
        /// New value
        value: Option<String>,
    },

    /// Interactive session that locks when idle
    Session,
}

/// Lock state machine driven from the terminal.
pub type CliMachine = LockStateMachine<TerminalPrompt, IdleUnavailable>;

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Path of the config file from `--config`, `FORT_CONFIG` or the default.
pub fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Settings::default_config_path(),
    }
}

/// Load settings, creating the config file on first use.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load_or_init(&config_path(cli)?)
}

/// Get the master passphrase, trying in order:
/// 1. `FORT_PASSPHRASE` env var (scripts, CI)
/// 2. Interactive prompt
///
/// Input is trimmed. Returns `Zeroizing<String>` so the passphrase is
/// wiped from memory on drop.
pub fn prompt_passphrase(prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(pass) = passphrase_from_env(PASSPHRASE_ENV) {
        return Ok(pass);
    }

    let pass = Zeroizing::new(
        dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| FortError::CommandFailed(format!("passphrase prompt: {e}")))?,
    );
    Ok(Zeroizing::new(pass.trim().to_string()))
}

/// Prompt for a new passphrase with confirmation.
///
/// Respects `env_var` for scripted usage. Enforces a minimum length.
pub fn prompt_new_passphrase(env_var: &str) -> Result<Zeroizing<String>> {
    if let Some(pass) = passphrase_from_env(env_var) {
        check_passphrase_len(&pass)?;
        return Ok(pass);
    }

    loop {
        let pass = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose master passphrase")
                .with_confirmation(
                    "Confirm master passphrase",
                    "Passphrases do not match, try again",
                )
                .interact()
                .map_err(|e| FortError::CommandFailed(format!("passphrase prompt: {e}")))?,
        );
        let pass = Zeroizing::new(pass.trim().to_string());

        if let Err(e) = check_passphrase_len(&pass) {
            output::warning(&e.to_string());
            continue;
        }

        return Ok(pass);
    }
}

fn passphrase_from_env(var: &str) -> Option<Zeroizing<String>> {
    let raw = Zeroizing::new(std::env::var(var).ok()?);
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| Zeroizing::new(trimmed.to_string()))
}

fn check_passphrase_len(pass: &str) -> Result<()> {
    if pass.chars().count() < MIN_PASSPHRASE_LEN {
        return Err(FortError::CommandFailed(format!(
            "passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
        )));
    }
    Ok(())
}

/// Build the state machine for the configured vault.
pub fn open_machine(settings: &Settings) -> Result<CliMachine> {
    LockStateMachine::new(settings, TerminalPrompt::new(), IdleUnavailable)
}

/// Open the vault with the master passphrase.
///
/// Fails instead of setting up a passphrase when the vault has none.
pub fn login(machine: &mut CliMachine) -> Result<usize> {
    if !machine.validator().is_configured() {
        output::tip("Run `fort init` to set up a master passphrase.");
        return Err(FortError::CommandFailed("vault is not initialized".into()));
    }

    let passphrase = prompt_passphrase("Master passphrase")?;
    machine.bootstrap(&passphrase)
}

/// Run `f` against the records of the vault.
///
/// A vault that was locked is unlocked for the duration of `f` and
/// locked again afterwards, even when `f` fails.
pub fn with_records<T>(cli: &Cli, f: impl FnOnce(&mut RecordStore) -> Result<T>) -> Result<T> {
    let settings = load_settings(cli)?;
    let mut machine = open_machine(&settings)?;
    let was_locked = machine.state() == VaultState::Locked;

    let result = login(&mut machine).and_then(|_| machine.store_mut().and_then(f));

    if was_locked && machine.has_session() {
        machine.lock()?;
    }
    result
}

/// Id of the first record titled exactly `title`.
pub fn record_id(store: &RecordStore, title: &str) -> Result<String> {
    store
        .find_by_title(title)
        .and_then(|index| store.get(index))
        .map(|record| record.id().to_string())
        .ok_or_else(|| FortError::NotFound(title.to_string()))
}
