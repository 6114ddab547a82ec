//! `fort show`: print every field of one record.

use crate::cli::output;
use crate::cli::{record_id, with_records, Cli};
use crate::errors::{FortError, Result};

/// Execute the `show` command.
pub fn execute(cli: &Cli, title: &str, reveal: bool) -> Result<()> {
    let record = with_records(cli, |store| {
        let id = record_id(store, title)?;
        store
            .find_by_id(&id)
            .cloned()
            .ok_or_else(|| FortError::NotFound(title.to_string()))
    })?;

    output::print_record(&record, reveal);
    if !reveal {
        output::tip("Pass --reveal to print the password.");
    }
    Ok(())
}
