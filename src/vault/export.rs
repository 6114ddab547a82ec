//! Plaintext export of records.
//!
//! Supported formats:
//! - `text` (default): one tab-separated line per record,
//!   `title\tusername\tpassword\turl\tnotes`
//! - `json`: an array of record objects
//!
//! Ids are never exported; they mean nothing outside the vault.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use super::format::{self, ENCRYPTED_SUFFIX, IV_FILE, PLAIN_SUFFIX};
use super::record::Record;
use super::store::RecordStore;
use crate::crypto::passphrase::PASSPHRASE_FILE;
use crate::errors::{FortError, Result};

/// Output format of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ExportFormat {
    type Err = FortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(FortError::CommandFailed(format!(
                "unknown export format '{other}', use 'text' or 'json'"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Writes records from a loaded store to a file.
pub struct DataExporter<'a> {
    store: &'a RecordStore,
}

impl<'a> DataExporter<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Render every record in display order.
    pub fn render_all(&self, format: ExportFormat) -> Result<String> {
        render(self.store.records(), format)
    }

    /// Export every record to `path`, overwriting it. Returns the count.
    pub fn export_all(&self, path: &Path, format: ExportFormat) -> Result<usize> {
        let content = self.render_all(format)?;
        write_export(path, &content)?;
        debug!(records = self.store.len(), %format, "exported all records");
        Ok(self.store.len())
    }

    /// Export the record with `id` to `path` as a single text line.
    pub fn export_one_by_id(&self, id: &str, path: &Path) -> Result<()> {
        let record = self
            .store
            .find_by_id(id)
            .ok_or_else(|| FortError::NotFound(id.to_string()))?;

        write_export(path, &text_line(record))?;
        debug!("exported one record");
        Ok(())
    }
}

fn render(records: &[Record], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Text => Ok(records.iter().map(text_line).collect()),
        ExportFormat::Json => serde_json::to_string_pretty(records)
            .map_err(|e| FortError::Serialization(format!("JSON export: {e}"))),
    }
}

fn text_line(record: &Record) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\n",
        record.title, record.username, record.password, record.url, record.notes
    )
}

fn write_export(path: &Path, content: &str) -> Result<()> {
    if is_vault_artifact(path) {
        return Err(FortError::CommandFailed(format!(
            "refusing to export over vault file {}",
            path.display()
        )));
    }

    format::write_private(path, content.as_bytes())
        .map_err(|e| FortError::CommandFailed(format!("failed to write export file: {e}")))
}

fn is_vault_artifact(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    name == IV_FILE
        || name == PASSPHRASE_FILE
        || name.ends_with(PLAIN_SUFFIX)
        || name.ends_with(ENCRYPTED_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::record::RecordDraft;
    use std::fs;
    use tempfile::TempDir;

    fn store_with_records(dir: &Path) -> RecordStore {
        let mut store = RecordStore::new(dir);
        store
            .add_draft(RecordDraft {
                title: "mail".into(),
                username: "bob".into(),
                password: "pw1".into(),
                ..RecordDraft::default()
            })
            .unwrap();
        store
            .add_draft(RecordDraft {
                title: "bank".into(),
                username: "alice".into(),
                password: "pw2".into(),
                url: "bank.example".into(),
                notes: "pin 1234".into(),
                favorite: true,
            })
            .unwrap();
        store
    }

    #[test]
    fn text_export_is_tab_separated_in_display_order() {
        let vault = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = store_with_records(vault.path());
        let path = out.path().join("export.txt");

        let count = DataExporter::new(&store)
            .export_all(&path, ExportFormat::Text)
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "bank\talice\tpw2\thttp://bank.example\tpin 1234\nmail\tbob\tpw1\t\t\n"
        );
    }

    #[test]
    fn json_export_omits_ids() {
        let vault = TempDir::new().unwrap();
        let store = store_with_records(vault.path());

        let json = DataExporter::new(&store)
            .render_all(ExportFormat::Json)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["title"], "bank");
        assert_eq!(parsed[0]["favorite"], true);
        assert!(parsed[0].get("id").is_none());
    }

    #[test]
    fn export_one_writes_single_line() {
        let vault = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = store_with_records(vault.path());
        let id = store.records()[1].id().to_string();
        let path = out.path().join("one.txt");

        DataExporter::new(&store).export_one_by_id(&id, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "mail\tbob\tpw1\t\t\n");
    }

    #[test]
    fn export_one_unknown_id_is_not_found() {
        let vault = TempDir::new().unwrap();
        let store = store_with_records(vault.path());
        let path = vault.path().join("x.txt");

        let err = DataExporter::new(&store)
            .export_one_by_id("{nope}", &path)
            .unwrap_err();
        assert!(matches!(err, FortError::NotFound(_)));
        assert!(!path.exists());
    }

    #[test]
    fn refuses_to_overwrite_vault_files() {
        let vault = TempDir::new().unwrap();
        let store = store_with_records(vault.path());
        let exporter = DataExporter::new(&store);

        for name in [IV_FILE, PASSPHRASE_FILE, "x.plain", "x.plain.enc"] {
            let result = exporter.export_all(&vault.path().join(name), ExportFormat::Text);
            assert!(result.is_err(), "{name} should be refused");
        }
    }

    #[test]
    fn format_parsing() {
        assert_eq!("TEXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("csv".parse::<ExportFormat>().is_err());
    }
}
