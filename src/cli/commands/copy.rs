//! `fort copy`: put one field of a record on the clipboard.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{record_id, with_records, Cli};
use crate::errors::{FortError, Result};
use crate::vault::Record;

/// Record field that can be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Field {
    Password,
    Username,
    Url,
}

impl Field {
    fn value_of(self, record: &Record) -> Zeroizing<String> {
        Zeroizing::new(match self {
            Self::Password => record.password.clone(),
            Self::Username => record.username.clone(),
            Self::Url => record.url.clone(),
        })
    }

    fn label(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Username => "username",
            Self::Url => "URL",
        }
    }
}

/// Execute the `copy` command.
pub fn execute(cli: &Cli, title: &str, field: Field) -> Result<()> {
    let value = with_records(cli, |store| {
        let id = record_id(store, title)?;
        store
            .find_by_id(&id)
            .map(|record| field.value_of(record))
            .ok_or_else(|| FortError::NotFound(title.to_string()))
    })?;

    copy_to_clipboard(&value)?;
    output::success(&format!("Copied {} of '{title}' to the clipboard", field.label()));
    Ok(())
}

/// Replace the system clipboard contents with `text`.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| FortError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| FortError::Clipboard(e.to_string()))
}
