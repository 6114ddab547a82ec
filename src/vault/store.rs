//! In-memory record set backed by one plaintext artifact per record.
//!
//! `RecordStore` only ever touches `*.plain` files, so it must only be
//! used while the vault is unlocked. Every mutation is written to disk
//! immediately; there is no separate save step.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::format::{self, decode_record, encode_record, list_plain_files, plain_path};
use super::record::{Record, RecordDraft};
use crate::errors::{FortError, Result};

/// Outcome of a `load_report` call.
#[derive(Debug)]
pub struct LoadReport {
    /// Number of records now in memory.
    pub loaded: usize,
    /// One `Parse` (or IO) error per artifact that was skipped.
    pub skipped: Vec<FortError>,
}

/// The ordered record list of an unlocked vault.
///
/// Favorites always sit in front of the other records.
#[derive(Debug)]
pub struct RecordStore {
    data_dir: PathBuf,
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            records: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Read every plaintext artifact into memory.
    ///
    /// Artifacts that don't match the record layout are skipped.
    pub fn load(&mut self) -> Result<&[Record]> {
        self.load_report()?;
        Ok(&self.records)
    }

    /// Same as `load`, but also returns what was skipped and why.
    pub fn load_report(&mut self) -> Result<LoadReport> {
        self.records.clear();
        let mut skipped = Vec::new();

        for path in list_plain_files(&self.data_dir)? {
            let parsed = fs::read_to_string(&path)
                .map_err(FortError::from)
                .and_then(|contents| decode_record(&path, &contents));

            match parsed {
                Ok(record) => self.records.push(record),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping record artifact");
                    skipped.push(e);
                }
            }
        }

        // Stable: favorites keep their relative order, as do the rest.
        self.records.sort_by_key(|r| !r.favorite);

        debug!(
            loaded = self.records.len(),
            skipped = skipped.len(),
            "record store loaded"
        );

        Ok(LoadReport {
            loaded: self.records.len(),
            skipped,
        })
    }

    /// Drop every record from memory. Files are untouched.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Persist a new record and insert it into the list.
    ///
    /// Favorites go to the front, everything else to the back.
    pub fn add(&mut self, record: Record) -> Result<()> {
        self.persist(&record)?;

        if record.favorite {
            self.records.insert(0, record);
        } else {
            self.records.push(record);
        }
        Ok(())
    }

    /// Build a record from `draft`, add it, and return its new id.
    pub fn add_draft(&mut self, draft: RecordDraft) -> Result<String> {
        let record = Record::new(draft);
        let id = record.id().to_string();
        self.add(record)?;
        Ok(id)
    }

    /// Delete the record with `id` from disk and memory.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let index = self
            .position(id)
            .ok_or_else(|| FortError::NotFound(id.to_string()))?;

        format::remove_if_exists(&plain_path(&self.data_dir, id))?;
        self.records.remove(index);
        Ok(())
    }

    /// Update the fields of an existing record in place.
    ///
    /// The id never changes. A record that becomes a favorite moves to
    /// the front; one that stops being a favorite moves to the back.
    pub fn edit(&mut self, id: &str, draft: RecordDraft) -> Result<()> {
        let index = self
            .position(id)
            .ok_or_else(|| FortError::NotFound(id.to_string()))?;

        let mut updated = self.records[index].clone();
        let was_favorite = updated.favorite;
        updated.apply(draft);
        self.persist(&updated)?;

        let now_favorite = updated.favorite;
        if was_favorite == now_favorite {
            self.records[index] = updated;
        } else {
            self.records.remove(index);
            if now_favorite {
                self.records.insert(0, updated);
            } else {
                self.records.push(updated);
            }
        }
        Ok(())
    }

    /// Flip the favorite flag of a record and return the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool> {
        let mut draft = self
            .find_by_id(id)
            .ok_or_else(|| FortError::NotFound(id.to_string()))?
            .to_draft();
        draft.favorite = !draft.favorite;
        let favorite = draft.favorite;

        self.edit(id, draft)?;
        Ok(favorite)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Index of the first record titled exactly `title`.
    ///
    /// Titles are not unique; the first match wins.
    pub fn find_by_title(&self, title: &str) -> Option<usize> {
        self.records.iter().position(|r| r.title == title)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Records whose title contains `term`, ignoring case.
    ///
    /// Returns a fresh favorite-first view; the store itself is not
    /// modified, so dropping the view restores the full list.
    pub fn search(&self, term: &str) -> Vec<Record> {
        let needle = term.to_lowercase();
        let mut matches: Vec<Record> = self
            .records
            .iter()
            .filter(|r| r.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        matches.sort_by_key(|r| !r.favorite);
        matches
    }

    /// All records in display order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    fn persist(&self, record: &Record) -> Result<()> {
        let contents = encode_record(record)?;
        format::write_atomic(&plain_path(&self.data_dir, record.id()), contents.as_bytes())
    }
}
