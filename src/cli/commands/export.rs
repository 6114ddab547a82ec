//! `fort export`: write records out as plain text or JSON.
//!
//! Supported formats:
//! - `text` (default): `title\tusername\tpassword\turl\tnotes`, one per line
//! - `json`: an array of record objects

use std::path::Path;

use crate::cli::output;
use crate::cli::{record_id, with_records, Cli};
use crate::errors::{FortError, Result};
use crate::vault::{DataExporter, ExportFormat};

/// Execute the `export` command.
pub fn execute(
    cli: &Cli,
    format: &str,
    output_path: Option<&Path>,
    title: Option<&str>,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    if title.is_some() && format != ExportFormat::Text {
        return Err(FortError::CommandFailed(
            "single record export only supports the text format".into(),
        ));
    }

    let exported = with_records(cli, |store| {
        let exporter = DataExporter::new(store);

        match (title, output_path) {
            (Some(title), Some(dest)) => {
                let id = record_id(store, title)?;
                exporter.export_one_by_id(&id, dest)?;
                Ok(Some(1))
            }
            (None, Some(dest)) => exporter.export_all(dest, format).map(Some),
            (_, None) => {
                // Write to stdout (no success message, just raw output).
                print!("{}", exporter.render_all(format)?);
                Ok(None)
            }
        }
    })?;

    if let (Some(count), Some(dest)) = (exported, output_path) {
        output::success(&format!(
            "Exported {count} record(s) to {} (format: {format})",
            dest.display()
        ));
        output::warning("The export file contains unencrypted passwords.");
    }

    Ok(())
}
