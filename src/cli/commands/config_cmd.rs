//! `fort config`: read or change settings in the `fortrc` file.

use std::path::PathBuf;

use comfy_table::{ContentArrangement, Table};

use crate::cli::output;
use crate::cli::{load_settings, Cli};
use crate::config::settings::{
    KEY_DATAPATH, KEY_FIRST_RUN, KEY_IDLE_INTERVAL, KEY_MINIMIZE_ON_CLOSE,
};
use crate::config::{ConfigProvider, Settings};
use crate::errors::{FortError, Result};
use crate::vault::format::relocate;

/// Execute the `config` command.
pub fn execute(cli: &Cli, key: Option<&str>, value: Option<&str>) -> Result<()> {
    let mut settings = load_settings(cli)?;

    match (key, value) {
        (None, _) => print_all(&settings),
        (Some(key), None) => match effective_value(&settings, key) {
            Some(value) => println!("{value}"),
            None => return Err(FortError::Config(format!("'{key}' is not set"))),
        },
        (Some(key), Some(value)) => {
            set_value(&mut settings, key, value)?;
            settings.save()?;
            output::success(&format!("{key} set to '{value}'"));
        }
    }

    Ok(())
}

fn print_all(settings: &Settings) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Value"]);

    for key in [KEY_DATAPATH, KEY_IDLE_INTERVAL, KEY_MINIMIZE_ON_CLOSE] {
        table.add_row(vec![
            key.to_string(),
            effective_value(settings, key).unwrap_or_default(),
        ]);
    }
    for (key, value) in settings.entries() {
        if ![KEY_DATAPATH, KEY_IDLE_INTERVAL, KEY_MINIMIZE_ON_CLOSE].contains(&key.as_str()) {
            table.add_row(vec![key.clone(), value.clone()]);
        }
    }

    println!("{table}");
    output::tip(&format!("Config file: {}", settings.path().display()));
}

/// Value of `key` with defaults applied for the known settings.
fn effective_value(settings: &Settings, key: &str) -> Option<String> {
    match key {
        KEY_DATAPATH => Some(settings.data_dir().display().to_string()),
        KEY_IDLE_INTERVAL => Some(settings.idle_interval_minutes().to_string()),
        KEY_MINIMIZE_ON_CLOSE => Some(ConfigProvider::minimize_on_close(settings).to_string()),
        other => settings.get(other).map(str::to_string),
    }
}

/// Validate and store one setting. Changing `datapath` moves the vault.
fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        KEY_IDLE_INTERVAL => {
            let minutes: u32 = value.trim().parse().map_err(|_| {
                FortError::Config(format!(
                    "{KEY_IDLE_INTERVAL} must be a whole number of minutes, got '{value}'"
                ))
            })?;
            settings.set(key, &minutes.to_string());
        }
        KEY_MINIMIZE_ON_CLOSE | KEY_FIRST_RUN => match value {
            "true" | "false" => settings.set(key, value),
            _ => {
                return Err(FortError::Config(format!(
                    "{key} must be 'true' or 'false', got '{value}'"
                )))
            }
        },
        KEY_DATAPATH => {
            let old_dir = settings.data_dir();
            let new_value = if value.trim().is_empty() {
                String::new()
            } else {
                std::path::absolute(PathBuf::from(value.trim()))?
                    .display()
                    .to_string()
            };
            settings.set(key, &new_value);
            let new_dir = settings.data_dir();

            if old_dir != new_dir && old_dir.is_dir() {
                let moved = relocate(&old_dir, &new_dir)?;
                if moved > 0 {
                    output::info(&format!(
                        "Moved {moved} vault file(s) to {}",
                        new_dir.display()
                    ));
                }
            }
        }
        other => {
            output::warning(&format!("'{other}' is not a Fort setting; storing it anyway"));
            settings.set(other, value);
        }
    }
    Ok(())
}
