//! `fort list`: display records in a table, favorites first.

use crate::cli::output;
use crate::cli::{with_records, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, search: Option<&str>) -> Result<()> {
    let records = with_records(cli, |store| {
        Ok(match search {
            Some(term) => store.search(term),
            None => store.records().to_vec(),
        })
    })?;

    match search {
        Some(term) => output::info(&format!("{} record(s) matching '{term}'", records.len())),
        None => output::info(&format!("{} record(s)", records.len())),
    }
    output::print_records_table(&records);

    Ok(())
}
