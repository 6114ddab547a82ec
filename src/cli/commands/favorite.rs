//! `fort favorite`: toggle the favorite flag of a record.

use crate::cli::output;
use crate::cli::{record_id, with_records, Cli};
use crate::errors::Result;

/// Execute the `favorite` command.
pub fn execute(cli: &Cli, title: &str) -> Result<()> {
    let favorite = with_records(cli, |store| {
        let id = record_id(store, title)?;
        store.toggle_favorite(&id)
    })?;

    if favorite {
        output::success(&format!("'{title}' marked as favorite"));
    } else {
        output::success(&format!("'{title}' is no longer a favorite"));
    }
    Ok(())
}
