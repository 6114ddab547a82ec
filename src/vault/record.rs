//! Credential records.
//!
//! `RecordDraft` is the field data a caller submits; `Record` is a
//! stored entry with an id that is assigned once and never changes.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Editable fields of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub favorite: bool,
}

/// A single credential entry.
///
/// `Record::default()` has no fields set and is the empty sentinel.
/// Field contents are wiped from memory when the record is dropped.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct Record {
    #[serde(skip)]
    id: String,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub favorite: bool,
}

impl Record {
    /// Create a record with a freshly generated id.
    pub fn new(draft: RecordDraft) -> Self {
        let mut record = Self::default();
        record.id = Uuid::new_v4().braced().to_string();
        record.apply(draft);
        record
    }

    /// Rebuild a record read back from disk, keeping its stored id.
    pub(crate) fn from_stored(
        id: String,
        title: String,
        username: String,
        password: String,
        url: String,
        notes: String,
        favorite: bool,
    ) -> Self {
        Self {
            id,
            title,
            username,
            password,
            url,
            notes,
            favorite,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` for the empty sentinel.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }

    /// Replace every editable field. The id is left alone.
    pub(crate) fn apply(&mut self, draft: RecordDraft) {
        self.title = draft.title;
        self.username = draft.username;
        self.password = draft.password;
        self.url = normalize_url(&draft.url);
        self.notes = draft.notes;
        self.favorite = draft.favorite;
    }

    /// Copy the editable fields out, e.g. to prefill an edit prompt.
    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            title: self.title.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            url: self.url.clone(),
            notes: self.notes.clone(),
            favorite: self.favorite,
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("url", &self.url)
            .field("favorite", &self.favorite)
            .finish_non_exhaustive()
    }
}

/// Trim a URL and default it to `http://` when no scheme is given.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}
