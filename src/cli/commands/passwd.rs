//! `fort passwd`: change the master passphrase.
//!
//! Records are re-encrypted under the new passphrase the next time the
//! vault is locked. A vault that was locked is locked again right away,
//! also when the change fails.

use crate::cli::output;
use crate::cli::{
    load_settings, open_machine, prompt_new_passphrase, prompt_passphrase, Cli,
    NEW_PASSPHRASE_ENV,
};
use crate::errors::{FortError, Result};
use crate::vault::VaultState;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let mut machine = open_machine(&settings)?;

    if !machine.validator().is_configured() {
        output::tip("Run `fort init` to set up a master passphrase.");
        return Err(FortError::CommandFailed("vault is not initialized".into()));
    }
    let was_locked = machine.state() == VaultState::Locked;

    // 1. Check both passphrases before anything is decrypted.
    output::info("Enter your current master passphrase.");
    let current = prompt_passphrase("Current master passphrase")?;
    machine.validator().validate(&current)?;

    output::info("Choose your new master passphrase.");
    let new = prompt_new_passphrase(NEW_PASSPHRASE_ENV)?;

    // 2. Open the vault and swap the credential.
    let result = machine
        .bootstrap(&current)
        .and_then(|_| machine.change_passphrase(&current, &new));

    // 3. A vault that was locked is locked again, under whichever key
    //    the session ended up holding.
    if was_locked && machine.has_session() {
        machine.lock()?;
    }
    result?;

    output::success("Master passphrase changed");
    Ok(())
}
