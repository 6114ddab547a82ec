//! `fort lock` and `fort unlock`: encrypt or decrypt every record on disk.

use crate::cli::output;
use crate::cli::{load_settings, login, open_machine, Cli};
use crate::errors::Result;
use crate::vault::VaultState;

/// Execute the `lock` command.
pub fn execute_lock(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let mut machine = open_machine(&settings)?;

    if machine.state() == VaultState::Locked {
        output::info("Vault is already locked.");
        return Ok(());
    }

    let count = login(&mut machine)?;
    machine.lock()?;

    output::success(&format!("Vault locked ({count} record(s) encrypted)"));
    Ok(())
}

/// Execute the `unlock` command.
pub fn execute_unlock(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let mut machine = open_machine(&settings)?;

    if machine.state() == VaultState::Unlocked {
        output::info("Vault is already unlocked.");
        return Ok(());
    }

    let count = login(&mut machine)?;

    output::success(&format!("Vault unlocked ({count} record(s))"));
    output::warning("Records stay unencrypted on disk until you run `fort lock`.");
    Ok(())
}
