//! `fort session`: interactive session that locks itself when idle.
//!
//! A reader thread forwards stdin lines and a ticker thread sends a
//! tick every second. Both only deliver messages; every vault operation
//! runs on the main thread. The reader waits for an acknowledgement
//! after each line so passphrase prompts own the terminal.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::cli::commands::copy::copy_to_clipboard;
use crate::cli::host::{InputIdle, TerminalPrompt};
use crate::cli::output;
use crate::cli::{load_settings, prompt_new_passphrase, Cli, PASSPHRASE_ENV};
use crate::config::settings::KEY_FIRST_RUN;
use crate::config::Settings;
use crate::errors::Result;
use crate::session::{
    CredentialPrompt, Effect, HostEvent, IdleSignal, LockStateMachine, Transition,
};
use crate::vault::VaultState;

type SessionMachine = LockStateMachine<TerminalPrompt, InputIdle>;

const TICK: Duration = Duration::from_secs(1);

/// Messages delivered to the main loop.
enum Input {
    Line(String),
    Tick,
    Eof,
}

/// What the main loop does after a transition.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Execute the `session` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut settings = load_settings(cli)?;
    let mut machine = LockStateMachine::new(&settings, TerminalPrompt::new(), InputIdle::new())?;

    if !machine.validator().is_configured() {
        output::info("No master passphrase yet. Choose one to create the vault.");
        let passphrase = prompt_new_passphrase(PASSPHRASE_ENV)?;
        let count = first_run(&mut machine, &mut settings, &passphrase)?;
        output::success(&format!("Vault created ({count} record(s))"));
    }
    if apply(machine.handle(HostEvent::Started)) == Flow::Exit {
        return Ok(());
    }

    print_help();

    let (tx, rx) = mpsc::channel();
    let (ack_tx, ack_rx) = mpsc::channel();
    spawn_reader(tx.clone(), ack_rx);
    spawn_ticker(tx);

    run_loop(&mut machine, &rx, &ack_tx);
    Ok(())
}

/// Create the master passphrase of a fresh vault and open it.
fn first_run<P: CredentialPrompt, I: IdleSignal>(
    machine: &mut LockStateMachine<P, I>,
    settings: &mut Settings,
    passphrase: &str,
) -> Result<usize> {
    let count = machine.setup_first_run(passphrase)?;
    settings.set_bool(KEY_FIRST_RUN, false);
    settings.save()?;
    Ok(count)
}

fn run_loop(machine: &mut SessionMachine, rx: &Receiver<Input>, ack: &Sender<()>) {
    while let Ok(input) = rx.recv() {
        match input {
            Input::Tick => {
                if apply(machine.handle(HostEvent::IdleTick)) == Flow::Exit {
                    return;
                }
            }
            Input::Line(line) => {
                machine.idle_mut().touch();
                let flow = run_command(machine, &line);
                // The reader may go on reading once the prompt is done.
                let _ = ack.send(());
                if flow == Flow::Exit {
                    return;
                }
            }
            Input::Eof => {
                let t = machine.handle(HostEvent::CloseRequested);
                apply(t);
                // No more input can arrive, so exit even if close minimizes.
                if machine.state() == VaultState::Unlocked {
                    apply(machine.handle(HostEvent::Minimized));
                }
                return;
            }
        }
    }
}

fn run_command(machine: &mut SessionMachine, line: &str) -> Flow {
    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "" => Flow::Continue,
        "help" | "?" => {
            print_help();
            Flow::Continue
        }
        "lock" | "minimize" => apply(machine.handle(HostEvent::Minimized)),
        "unlock" | "restore" => apply(machine.handle(HostEvent::Restored)),
        "quit" | "exit" | "close" => apply(machine.handle(HostEvent::CloseRequested)),
        "status" => {
            println!("Vault is {}", output::state_label(machine.state()));
            Flow::Continue
        }
        "list" | "ls" | "search" => {
            if require_unlocked(machine) {
                let records = if arg.is_empty() {
                    machine.store().records().to_vec()
                } else {
                    machine.store().search(arg)
                };
                output::print_records_table(&records);
            }
            Flow::Continue
        }
        "show" | "copy" | "user" => {
            if require_unlocked(machine) {
                record_action(machine, command, arg);
            }
            Flow::Continue
        }
        other => {
            output::warning(&format!("Unknown command '{other}'. Type `help`."));
            Flow::Continue
        }
    }
}

fn record_action(machine: &SessionMachine, command: &str, title: &str) {
    let store = machine.store();
    let Some(record) = store.find_by_title(title).and_then(|i| store.get(i)) else {
        output::error(&format!("Record '{title}' not found"));
        return;
    };

    match command {
        "show" => output::print_record(record, false),
        "copy" | "user" => {
            let (value, label) = if command == "copy" {
                (record.password.as_str(), "password")
            } else {
                (record.username.as_str(), "username")
            };
            match copy_to_clipboard(value) {
                Ok(()) => output::success(&format!("Copied {label} of '{title}'")),
                Err(e) => output::error(&e.to_string()),
            }
        }
        _ => {}
    }
}

fn require_unlocked(machine: &SessionMachine) -> bool {
    if machine.state() == VaultState::Locked {
        output::info("Vault is locked. Type `unlock` first.");
        return false;
    }
    true
}

/// Carry out the effects of a transition.
fn apply(transition: Transition) -> Flow {
    let mut flow = Flow::Continue;

    for effect in transition.effects {
        match effect {
            Effect::ClearRecords => output::info("Vault locked."),
            Effect::ShowRecords(count) => {
                output::success(&format!("Vault unlocked ({count} record(s))"));
            }
            Effect::ForceMinimize => {
                if transition.state == VaultState::Locked {
                    output::tip("Type `unlock` to open the vault again.");
                }
            }
            Effect::DismissPrompt => debug!("passphrase prompt dismissed"),
            Effect::ShowError(message) => output::error(&message),
            Effect::Exit => flow = Flow::Exit,
        }
    }

    flow
}

fn print_help() {
    output::tip("Commands: list [TEXT], show TITLE, copy TITLE, user TITLE, lock, unlock, status, quit");
}

fn spawn_reader(tx: Sender<Input>, ack: Receiver<()>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => {
                    let _ = tx.send(Input::Eof);
                    return;
                }
                Ok(_) => {
                    if tx.send(Input::Line(line.trim().to_string())).is_err() {
                        return;
                    }
                    if ack.recv().is_err() {
                        return;
                    }
                }
            }
        }
    });
}

fn spawn_ticker(tx: Sender<Input>) {
    thread::spawn(move || loop {
        thread::sleep(TICK);
        if tx.send(Input::Tick).is_err() {
            return;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PassphraseValidator;
    use tempfile::TempDir;

    #[test]
    fn first_run_sets_up_passphrase_and_clears_flag() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::load_or_init(&dir.path().join("fortrc")).unwrap();
        assert!(settings.is_first_run());

        let mut machine =
            LockStateMachine::new(&settings, TerminalPrompt::new(), InputIdle::new())
                .unwrap()
                .with_validator(PassphraseValidator::with_cost(dir.path(), 4));

        assert_eq!(
            first_run(&mut machine, &mut settings, "correcthorsebattery").unwrap(),
            0
        );
        assert_eq!(machine.state(), VaultState::Unlocked);
        assert!(machine.has_session());
        assert!(!settings.is_first_run());

        let reloaded = Settings::load(&dir.path().join("fortrc")).unwrap();
        assert!(!reloaded.is_first_run());

        // A second first run is refused and leaves the settings alone.
        assert!(first_run(&mut machine, &mut settings, "another passphrase").is_err());
    }

    #[test]
    fn exit_effect_stops_the_loop() {
        let t = Transition {
            state: VaultState::Locked,
            effects: vec![Effect::ClearRecords, Effect::Exit],
        };
        assert_eq!(apply(t), Flow::Exit);
    }

    #[test]
    fn other_effects_continue() {
        let t = Transition {
            state: VaultState::Locked,
            effects: vec![Effect::ForceMinimize, Effect::ShowError("x".into())],
        };
        assert_eq!(apply(t), Flow::Continue);
    }
}
