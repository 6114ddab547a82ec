//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;
use zeroize::Zeroizing;

use crate::vault::{Record, VaultState};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Colored label for a vault state.
pub fn state_label(state: VaultState) -> String {
    match state {
        VaultState::Locked => style("locked").green().bold().to_string(),
        VaultState::Unlocked => style("unlocked").yellow().bold().to_string(),
    }
}

/// Print a table of records (Title, Username, URL). Favorites get a star.
pub fn print_records_table(records: &[Record]) {
    if records.is_empty() {
        info("No records in this vault yet.");
        tip("Run `fort add <TITLE>` to add your first record.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Title", "Username", "URL"]);

    for r in records {
        let star = if r.favorite { "\u{2605}" } else { "" };
        table.add_row(vec![
            star.to_string(),
            r.title.clone(),
            r.username.clone(),
            r.url.clone(),
        ]);
    }

    println!("{table}");
}

/// Print every field of one record. The password is masked unless
/// `reveal` is set.
pub fn print_record(record: &Record, reveal: bool) {
    let password = Zeroizing::new(if reveal {
        record.password.clone()
    } else {
        "\u{2022}".repeat(8)
    });

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Title", record.title.as_str()]);
    table.add_row(vec!["Username", record.username.as_str()]);
    table.add_row(vec!["Password", password.as_str()]);
    table.add_row(vec!["URL", record.url.as_str()]);
    table.add_row(vec!["Favorite", if record.favorite { "yes" } else { "no" }]);
    table.add_row(vec!["Notes", record.notes.as_str()]);

    println!("{table}");
}
