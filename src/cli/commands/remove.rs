//! `fort remove`: delete a record from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{record_id, with_records, Cli};
use crate::errors::{FortError, Result};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, title: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove record '{title}'?"))
            .default(false)
            .interact()
            .map_err(|e| FortError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let remaining = with_records(cli, |store| {
        let id = record_id(store, title)?;
        store.remove(&id)?;
        Ok(store.len())
    })?;

    output::success(&format!("Removed record '{title}' ({remaining} left)"));
    Ok(())
}
