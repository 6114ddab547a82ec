//! `fort status`: show where the vault lives and whether it is locked.

use crate::cli::output;
use crate::cli::{load_settings, Cli};
use crate::config::ConfigProvider;
use crate::crypto::PassphraseValidator;
use crate::errors::Result;
use crate::vault::format::{list_encrypted_files, list_plain_files};
use crate::vault::{VaultCipher, VaultState};

/// Execute the `status` command. Never asks for the passphrase.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let data_dir = settings.data_dir();
    let initialized = PassphraseValidator::new(&data_dir).is_configured();

    println!("Config:       {}", settings.path().display());
    println!("Vault:        {}", data_dir.display());

    if !initialized {
        println!("State:        not initialized");
        output::tip("Run `fort init` to set up a master passphrase.");
        return Ok(());
    }

    let state = VaultCipher::new(&data_dir).state();
    let records = if !data_dir.exists() {
        0
    } else {
        match state {
            VaultState::Locked => list_encrypted_files(&data_dir)?.len(),
            VaultState::Unlocked => list_plain_files(&data_dir)?.len(),
        }
    };

    let idle = match settings.idle_interval_minutes() {
        0 => "off".to_string(),
        minutes => format!("{minutes} min"),
    };

    println!("State:        {}", output::state_label(state));
    println!("Records:      {records}");
    println!("Auto-lock:    {idle}");
    println!(
        "Close:        {}",
        if ConfigProvider::minimize_on_close(&settings) {
            "lock and keep running"
        } else {
            "lock and exit"
        }
    );

    if state == VaultState::Unlocked {
        output::warning("Records are stored unencrypted until you run `fort lock`.");
    }

    Ok(())
}
