//! `fort add`: add a record to the vault.

use std::io::{self, BufRead, IsTerminal};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{with_records, Cli};
use crate::errors::{FortError, Result};
use crate::vault::RecordDraft;

/// Fields given on the command line.
pub struct AddArgs<'a> {
    pub title: &'a str,
    pub username: &'a str,
    pub url: &'a str,
    pub notes: &'a str,
    pub favorite: bool,
}

/// Execute the `add` command.
pub fn execute(cli: &Cli, args: AddArgs<'_>) -> Result<()> {
    if args.title.trim().is_empty() {
        return Err(FortError::CommandFailed("title cannot be empty".into()));
    }

    let password = read_password(args.title)?;
    let draft = RecordDraft {
        title: args.title.trim().to_string(),
        username: args.username.to_string(),
        password: password.to_string(),
        url: args.url.to_string(),
        notes: args.notes.to_string(),
        favorite: args.favorite,
    };

    let total = with_records(cli, |store| {
        store.add_draft(draft)?;
        Ok(store.len())
    })?;

    output::success(&format!("Record '{}' added ({total} total)", args.title.trim()));
    Ok(())
}

/// Read the record password from piped stdin or a hidden prompt.
pub fn read_password(title: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut line = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut line)?;
        return Ok(Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string()));
    }

    let password = dialoguer::Password::new()
        .with_prompt(format!("Password for {title}"))
        .allow_empty_password(true)
        .interact()
        .map_err(|e| FortError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(password))
}
