//! `fort init`: set up the master passphrase for a new vault.

use std::fs;

use crate::cli::output;
use crate::cli::{load_settings, prompt_new_passphrase, Cli, PASSPHRASE_ENV};
use crate::config::settings::KEY_FIRST_RUN;
use crate::config::ConfigProvider;
use crate::crypto::PassphraseValidator;
use crate::errors::{FortError, Result};
use crate::vault::{VaultCipher, VaultState};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut settings = load_settings(cli)?;
    let data_dir = settings.data_dir();

    // 1. Create the vault directory if it doesn't exist.
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
        output::info(&format!("Created vault directory: {}", data_dir.display()));
    }

    // 2. Refuse to replace an existing credential.
    let validator = PassphraseValidator::new(&data_dir);
    if validator.is_configured() {
        output::tip("Use `fort passwd` to change the master passphrase.");
        return Err(FortError::CommandFailed(format!(
            "a master passphrase already exists in {}",
            data_dir.display()
        )));
    }
    if VaultCipher::new(&data_dir).state() == VaultState::Locked {
        return Err(FortError::State(
            "found encrypted records without a passphrase credential".into(),
        ));
    }

    // 3. Prompt for a new passphrase (with confirmation) and store it.
    let passphrase = prompt_new_passphrase(PASSPHRASE_ENV)?;
    validator.setup(&passphrase)?;

    // 4. First run is over.
    settings.set_bool(KEY_FIRST_RUN, false);
    settings.save()?;

    output::success(&format!("Vault created at {}", data_dir.display()));
    output::tip("Run `fort add <TITLE>` to add a record.");
    output::tip("Run `fort session` to work with the vault interactively.");

    Ok(())
}
