//! On-disk layout of a Fort vault directory.
//!
//! ```text
//! <id>.plain       plaintext record (unlocked)
//! <id>.plain.enc   base64 AES-256-CBC record (locked)
//! fort.iv          initialization vector, present iff locked
//! fort.pph         bcrypt master passphrase credential
//! ```
//!
//! A plaintext record is six newline-terminated fields followed by
//! the notes, which run to the end of the file:
//!
//! ```text
//! title\nusername\npassword\nfavorite(0|1)\nurl\nid\n<notes...>
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::record::Record;
use crate::crypto::passphrase::PASSPHRASE_FILE;
use crate::errors::{FortError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Extension of a plaintext record artifact.
pub const PLAIN_SUFFIX: &str = ".plain";

/// Suffix appended to a record artifact while the vault is locked.
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// File name of the persisted initialization vector.
pub const IV_FILE: &str = "fort.iv";

/// Number of newline-terminated fields before the notes.
const FIELD_COUNT: usize = 6;

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Path of the plaintext artifact for record `id`.
pub fn plain_path(data_dir: &Path, id: &str) -> PathBuf {
    data_dir.join(format!("{id}{PLAIN_SUFFIX}"))
}

/// Hidden sibling used to stage a write to `target`.
pub fn staging_path(target: &Path) -> PathBuf {
    let parent = target.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        target.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// All plaintext record artifacts in `data_dir`, sorted by file name.
pub fn list_plain_files(data_dir: &Path) -> Result<Vec<PathBuf>> {
    list_with_suffix(data_dir, PLAIN_SUFFIX)
}

/// All encrypted record artifacts in `data_dir`, sorted by file name.
pub fn list_encrypted_files(data_dir: &Path) -> Result<Vec<PathBuf>> {
    list_with_suffix(data_dir, &format!("{PLAIN_SUFFIX}{ENCRYPTED_SUFFIX}"))
}

fn list_with_suffix(data_dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(data_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        // Staged temp files are hidden; never pick them up.
        if name.starts_with('.') || !name.ends_with(suffix) || name.len() == suffix.len() {
            continue;
        }

        files.push(entry.path());
    }

    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// Record encoding
// ---------------------------------------------------------------------------

/// Serialize a record to the plaintext artifact layout.
pub fn encode_record(record: &Record) -> Result<String> {
    let single_line = [
        ("title", record.title.as_str()),
        ("username", record.username.as_str()),
        ("password", record.password.as_str()),
        ("url", record.url.as_str()),
        ("id", record.id()),
    ];
    for (field, value) in single_line {
        if value.contains('\n') || value.contains('\r') {
            return Err(FortError::Serialization(format!(
                "{field} cannot contain a line break"
            )));
        }
    }

    Ok(format!(
        "{}\n{}\n{}\n{}\n{}\n{}\n{}",
        record.title,
        record.username,
        record.password,
        u8::from(record.favorite),
        record.url,
        record.id(),
        record.notes
    ))
}

/// Parse a plaintext artifact read from `path`.
pub fn decode_record(path: &Path, contents: &str) -> Result<Record> {
    let parse_error = |reason: &str| FortError::Parse {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut rest = contents;
    for _ in 0..FIELD_COUNT {
        let (line, tail) = rest
            .split_once('\n')
            .ok_or_else(|| parse_error("expected six newline-terminated fields"))?;
        fields.push(line.strip_suffix('\r').unwrap_or(line));
        rest = tail;
    }

    let favorite = match fields[3] {
        "0" => false,
        "1" => true,
        other => return Err(parse_error(&format!("favorite flag must be 0 or 1, got {other:?}"))),
    };

    let id = fields[5];
    if id.is_empty() {
        return Err(parse_error("record id is empty"));
    }

    Ok(Record::from_stored(
        id.to_string(),
        fields[0].to_string(),
        fields[1].to_string(),
        fields[2].to_string(),
        fields[4].to_string(),
        rest.to_string(),
        favorite,
    ))
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Write `bytes` to `path` via a staged temp file and a rename, so
/// readers never see a half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = staging_path(path);
    write_private(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Write a file readable only by its owner.
pub fn write_private(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Remove a file, treating "already gone" as success.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FortError::Io(e)),
    }
}

/// Move every vault artifact from `from` into `to`.
///
/// Used when the configured data path changes. Returns the number of
/// files moved.
pub fn relocate(from: &Path, to: &Path) -> Result<usize> {
    fs::create_dir_all(to)?;

    let mut sources = list_plain_files(from)?;
    sources.extend(list_encrypted_files(from)?);
    for name in [IV_FILE, PASSPHRASE_FILE] {
        let path = from.join(name);
        if path.is_file() {
            sources.push(path);
        }
    }

    for source in &sources {
        let name = source.file_name().unwrap_or_default();
        let target = to.join(name);
        if fs::rename(source, &target).is_err() {
            // Cross-device moves cannot rename; copy then delete.
            fs::copy(source, &target)?;
            fs::remove_file(source)?;
        }
    }

    Ok(sources.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::record::RecordDraft;
    use tempfile::TempDir;

    fn sample() -> Record {
        Record::new(RecordDraft {
            title: "bank".into(),
            username: "alice".into(),
            password: "p1".into(),
            url: "https://bank.example".into(),
            notes: "line one\nline two\n".into(),
            favorite: true,
        })
    }

    #[test]
    fn encode_writes_fields_in_order() {
        let record = sample();
        let text = encode_record(&record).unwrap();
        let expected = format!(
            "bank\nalice\np1\n1\nhttps://bank.example\n{}\nline one\nline two\n",
            record.id()
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn decode_reads_notes_as_rest_of_file() {
        let path = Path::new("x.plain");
        let text = "t\nu\np\n0\n\n{id}\nfirst\n\nthird";
        let record = decode_record(path, text).unwrap();

        assert_eq!(record.id(), "{id}");
        assert_eq!(record.title, "t");
        assert_eq!(record.url, "");
        assert!(!record.favorite);
        assert_eq!(record.notes, "first\n\nthird");
    }

    #[test]
    fn decode_accepts_crlf_fields() {
        let record = decode_record(Path::new("x"), "t\r\nu\r\np\r\n1\r\n\r\nid\r\n").unwrap();
        assert_eq!(record.title, "t");
        assert!(record.favorite);
        assert_eq!(record.id(), "id");
        assert_eq!(record.notes, "");
    }

    #[test]
    fn decode_rejects_short_file() {
        let err = decode_record(Path::new("x.plain"), "title\nuser\n").unwrap_err();
        assert!(matches!(err, FortError::Parse { .. }));
    }

    #[test]
    fn decode_rejects_bad_favorite_flag() {
        let err = decode_record(Path::new("x.plain"), "t\nu\np\nyes\n\nid\n").unwrap_err();
        assert!(err.to_string().contains("favorite flag"));
    }

    #[test]
    fn decode_rejects_empty_id() {
        assert!(decode_record(Path::new("x.plain"), "t\nu\np\n0\n\n\n").is_err());
    }

    #[test]
    fn encode_rejects_multiline_title() {
        let mut record = sample();
        record.title = "two\nlines".into();
        assert!(matches!(
            encode_record(&record),
            Err(FortError::Serialization(_))
        ));
    }

    #[test]
    fn listing_ignores_staged_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.plain"), "").unwrap();
        fs::write(dir.path().join("b.plain.enc"), "").unwrap();
        fs::write(dir.path().join(".c.plain.tmp"), "").unwrap();
        fs::write(dir.path().join(".d.plain"), "").unwrap();
        fs::write(dir.path().join(IV_FILE), "").unwrap();

        let plain = list_plain_files(dir.path()).unwrap();
        assert_eq!(plain, vec![dir.path().join("a.plain")]);

        let enc = list_encrypted_files(dir.path()).unwrap();
        assert_eq!(enc, vec![dir.path().join("b.plain.enc")]);
    }

    #[test]
    fn staging_path_is_hidden_sibling() {
        let path = staging_path(Path::new("/vault/{id}.plain.enc"));
        assert_eq!(path, PathBuf::from("/vault/.{id}.plain.enc.tmp"));
    }

    #[test]
    fn write_atomic_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(IV_FILE);
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn relocate_moves_all_artifacts() {
        let from = TempDir::new().unwrap();
        let to = TempDir::new().unwrap();
        let target = to.path().join("moved");
        for name in ["a.plain", "b.plain.enc", IV_FILE, PASSPHRASE_FILE] {
            fs::write(from.path().join(name), name).unwrap();
        }
        fs::write(from.path().join("fortrc"), "firstrun=false\n").unwrap();

        let moved = relocate(from.path(), &target).unwrap();
        assert_eq!(moved, 4);
        assert!(target.join("b.plain.enc").exists());
        assert!(target.join(PASSPHRASE_FILE).exists());
        assert!(from.path().join("fortrc").exists());
        assert!(!from.path().join("a.plain").exists());
    }
}
