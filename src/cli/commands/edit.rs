//! `fort edit`: change the fields of an existing record.
//!
//! Flags replace single fields. Without any flags and on a terminal,
//! every field is prompted for with the current value prefilled.

use std::io::{self, IsTerminal};

use dialoguer::{Confirm, Input};

use crate::cli::commands::add::read_password;
use crate::cli::output;
use crate::cli::{record_id, with_records, Cli};
use crate::errors::{FortError, Result};
use crate::vault::RecordDraft;

/// Field changes requested on the command line.
#[derive(Default)]
pub struct EditArgs<'a> {
    pub new_title: Option<&'a str>,
    pub username: Option<&'a str>,
    pub url: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub password: bool,
}

impl EditArgs<'_> {
    fn is_empty(&self) -> bool {
        self.new_title.is_none()
            && self.username.is_none()
            && self.url.is_none()
            && self.notes.is_none()
            && !self.password
    }

    /// Apply the flags to `draft`, leaving other fields as they are.
    fn apply(&self, draft: &mut RecordDraft) {
        if let Some(title) = self.new_title {
            draft.title = title.trim().to_string();
        }
        if let Some(username) = self.username {
            draft.username = username.to_string();
        }
        if let Some(url) = self.url {
            draft.url = url.to_string();
        }
        if let Some(notes) = self.notes {
            draft.notes = notes.to_string();
        }
    }
}

/// Execute the `edit` command.
pub fn execute(cli: &Cli, title: &str, args: EditArgs<'_>) -> Result<()> {
    let interactive = args.is_empty() && io::stdin().is_terminal();
    if args.is_empty() && !interactive {
        return Err(FortError::CommandFailed(
            "nothing to change, pass at least one field flag".into(),
        ));
    }

    let new_title = with_records(cli, |store| {
        let id = record_id(store, title)?;
        let mut draft = store
            .find_by_id(&id)
            .map(|record| record.to_draft())
            .ok_or_else(|| FortError::NotFound(title.to_string()))?;

        if interactive {
            prompt_fields(&mut draft)?;
        } else {
            args.apply(&mut draft);
            if args.password {
                draft.password = read_password(&draft.title)?.to_string();
            }
        }

        if draft.title.is_empty() {
            return Err(FortError::CommandFailed("title cannot be empty".into()));
        }

        let new_title = draft.title.clone();
        store.edit(&id, draft)?;
        Ok(new_title)
    })?;

    output::success(&format!("Record '{new_title}' updated"));
    Ok(())
}

fn prompt_fields(draft: &mut RecordDraft) -> Result<()> {
    draft.title = text("Title", &draft.title)?.trim().to_string();
    draft.username = text("Username", &draft.username)?;
    draft.url = text("URL", &draft.url)?;

    let change_password = Confirm::new()
        .with_prompt("Change password?")
        .default(false)
        .interact()
        .map_err(|e| FortError::CommandFailed(format!("confirm prompt: {e}")))?;
    if change_password {
        draft.password = read_password(&draft.title)?.to_string();
    }

    let keep_notes = draft.notes.contains('\n');
    if keep_notes {
        output::info("Multi-line notes are kept; use --notes to replace them.");
    } else {
        draft.notes = text("Notes", &draft.notes)?;
    }
    Ok(())
}

fn text(prompt: &str, current: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| FortError::CommandFailed(format!("input prompt: {e}")))
}
